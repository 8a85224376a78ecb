use std::io::Write;

use reqwest::Client;

use crate::{
    config::Config,
    error,
    listenbrainz::ReleaseSource,
    media,
    message::{MAX_MESSAGE_LENGTH, MessageFormatter},
    musicbrainz::CoverSource,
    pipeline::{self, ReleaseQuery},
    retry::RetryPolicy,
    social::{MastodonClient, Poster, TwitterClient},
    types::{Period, PostStatus, ReleaseRecord},
    utils, warning,
};

/// Result of one attempt to publish on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to post.
    Skipped,
    Published(String),
    DryRun,
    Failed(String),
    /// Credentials were refused; the platform should not be tried again.
    AuthRejected(String),
}

/// Posting clients of the configured platforms.
///
/// A platform whose credentials are refused is removed for the rest of the run.
#[derive(Default)]
pub struct Platforms {
    pub mastodon: Option<MastodonClient>,
    pub twitter: Option<TwitterClient>,
}

impl Platforms {
    pub fn from_config(config: &Config, client: &Client) -> Self {
        Self {
            mastodon: config.mastodon.clone().map(|credentials| {
                MastodonClient::new(
                    client.clone(),
                    credentials,
                    config.message_retry,
                    config.download_retry,
                    config.debug,
                )
            }),
            twitter: config.twitter.clone().map(|credentials| {
                TwitterClient::new(
                    client.clone(),
                    credentials,
                    &config.twitter_api_url,
                    &config.twitter_upload_url,
                    config.message_retry,
                    config.download_retry,
                    config.debug,
                )
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mastodon.is_none() && self.twitter.is_none()
    }
}

fn step(label: &str) {
    print!("{}", utils::pad_label(label));
    let _ = std::io::stdout().flush();
}

/// Prints a message with every line prefixed by a box border.
pub fn preview(message: &str) -> String {
    if message.is_empty() {
        return "(Sorry, empty list of albums, so empty message)".to_string();
    }

    message
        .lines()
        .map(|line| format!("  │ {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stages the covers the platform needs and posts `message` with them.
///
/// Local cover files are removed before this returns, whatever the outcome.
pub async fn send<P: Poster>(
    poster: &P,
    releases: &[ReleaseRecord],
    message: &str,
    client: &Client,
    download_retry: &RetryPolicy,
) -> SendOutcome {
    step(&format!(
        "Sending {} ({} characters)...",
        poster.post_noun(),
        message.chars().count()
    ));

    if releases.is_empty() || message.is_empty() {
        println!(" SKIPPED!");
        return SendOutcome::Skipped;
    }

    let staged = media::stage_covers(releases, poster.media_kind(), client, download_retry).await;
    let outcome = match poster.post(message, staged.items()).await {
        Ok(PostStatus::Published { id }) => {
            println!(" DONE!");
            SendOutcome::Published(id)
        }
        Ok(PostStatus::DryRun) => {
            println!(" DONE!");
            SendOutcome::DryRun
        }
        Err(e) if e.is_auth() => {
            println!(" ERROR! Wrong {} authentication keys.", poster.name());
            warning!("{}: {}", poster.name(), e);
            SendOutcome::AuthRejected(e.to_string())
        }
        Err(e) => {
            println!(" ERROR! {}", e);
            SendOutcome::Failed(e.to_string())
        }
    };

    if let Err(e) = staged.close() {
        warning!("Cannot remove staged covers: {}", e);
    }

    outcome
}

/// Builds and publishes the report of one period.
///
/// Failures are printed and never abort the run: a failed fetch gives an empty
/// report, a failed platform does not keep the others from posting.
pub async fn report<H: ReleaseSource, C: CoverSource>(
    config: &Config,
    history: &H,
    covers: &C,
    platforms: &mut Platforms,
    client: &Client,
    period: Period,
) -> Vec<ReleaseRecord> {
    let query = ReleaseQuery {
        user: &config.lb_user,
        request_count: config.lb_fetch,
        verified_count: config.lb_verified,
        period,
    };

    step(&format!(
        "Fetching top {} releases from ListenBrainz...",
        query.request_count
    ));
    let releases = match pipeline::fetch_releases(history, &query).await {
        Ok(releases) => {
            println!(" DONE!");
            releases
        }
        Err(e) => {
            println!(" ERROR! {}", e);
            Vec::new()
        }
    };

    step(&format!(
        "Filtering top {} verified releases...",
        query.verified_count
    ));
    let mut releases = pipeline::select_verified(releases, query.verified_count);
    println!(" DONE!");

    if !releases.is_empty() {
        step("Fetching covers from MusicBrainz...");
        pipeline::attach_covers(covers, &mut releases).await;
        println!(" DONE!");
    }

    let message = MessageFormatter::new(&config.locale, config.lb_verified).format(
        &releases,
        period,
        MAX_MESSAGE_LENGTH,
    );
    println!("\nMessage:\n\n{}\n", preview(&message));

    let mastodon_rejected = match &platforms.mastodon {
        Some(mastodon) => matches!(
            send(mastodon, &releases, &message, client, &config.download_retry).await,
            SendOutcome::AuthRejected(_)
        ),
        None => false,
    };
    if mastodon_rejected {
        error!("Posting to Mastodon is disabled for the rest of this run.");
        platforms.mastodon = None;
    }

    let twitter_rejected = match &platforms.twitter {
        Some(twitter) => matches!(
            send(twitter, &releases, &message, client, &config.download_retry).await,
            SendOutcome::AuthRejected(_)
        ),
        None => false,
    };
    if twitter_rejected {
        error!("Posting to Twitter is disabled for the rest of this run.");
        platforms.twitter = None;
    }

    releases
}
