//! # Social Module
//!
//! Posting clients, one per platform. Each client authenticates, uploads the
//! staged covers, then publishes the text together with the uploaded media as
//! a single status.
//!
//! ## Platforms
//!
//! - [`mastodon`] - bearer token auth; covers are passed as remote URLs and
//!   fetched by the client right before uploading
//! - [`twitter`] - OAuth 1.0a user context ([`oauth`]); covers are uploaded
//!   from local files
//!
//! ## Error Handling
//!
//! Server side failures (5xx, 429, connection problems) are retried with the
//! message retry policy; the last error surfaces once attempts run out.
//! Rejected credentials and bad requests come back as [`Error::Auth`] right
//! away, without retrying.
//!
//! A cover that cannot be read or downloaded is left out of the status with a
//! warning; whatever the image host answers never counts as a platform error.
//!
//! In debug mode no request is made at all and every post reports
//! [`PostStatus::DryRun`].

pub mod mastodon;
pub mod oauth;
pub mod twitter;

use reqwest::Client;

pub use mastodon::MastodonClient;
pub use twitter::TwitterClient;

use crate::{
    download,
    error::Error,
    retry::RetryPolicy,
    types::{MediaKind, PostStatus, StagedMedia},
    warning,
};

/// Images attached to a single status, at most.
pub const MAX_MEDIA: usize = 4;

/// A platform that accepts a status with images.
///
/// Implementors authenticate, upload up to [`MAX_MEDIA`] images and publish
/// the text with the uploaded media attached, in that order.
#[allow(async_fn_in_trait)]
pub trait Poster {
    /// Platform name, e.g. "Mastodon".
    fn name(&self) -> &'static str;

    /// What a status is called on the platform, e.g. "toot".
    fn post_noun(&self) -> &'static str;

    /// Whether covers have to be staged as local files or can stay URLs.
    fn media_kind(&self) -> MediaKind;

    /// Publishes `text` with `media` attached.
    ///
    /// # Arguments
    ///
    /// * `text` - The status text, already within the platform limit
    /// * `media` - Covers staged as [`Poster::media_kind`] asks for. Only the
    ///   first [`MAX_MEDIA`] readable ones are attached; a cover that cannot
    ///   be read or downloaded is skipped with a warning
    ///
    /// # Returns
    ///
    /// [`PostStatus::Published`] with the platform id of the new status, or
    /// [`PostStatus::DryRun`] in debug mode, where no request is made.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] when the platform refuses the credentials or the
    ///   request, without retrying
    /// - [`Error::Server`] or [`Error::Http`] once the message retry policy is
    ///   exhausted
    ///
    /// # Example
    ///
    /// ```
    /// let status = mastodon.post("#TopAlbums in May", staged.items()).await?;
    /// ```
    async fn post(&self, text: &str, media: &[StagedMedia]) -> Result<PostStatus, Error>;
}

/// Bytes of a staged cover, wherever it lives.
pub(crate) async fn media_bytes(
    client: &Client,
    media: &StagedMedia,
    retry: &RetryPolicy,
) -> Result<Vec<u8>, Error> {
    match media {
        StagedMedia::Local(path) => Ok(async_fs::read(path).await?),
        StagedMedia::Remote(url) => download::fetch_bytes(client, url, retry).await,
    }
}

/// Like [`media_bytes`], but a failure is only a warning.
///
/// Errors from the image host must not be mistaken for errors of the
/// platform, so they never leave this function.
pub(crate) async fn cover_bytes(
    client: &Client,
    media: &StagedMedia,
    retry: &RetryPolicy,
) -> Option<Vec<u8>> {
    match media_bytes(client, media, retry).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warning!("Skipping cover {}: {}", media, e);
            None
        }
    }
}

pub(crate) fn image_part(bytes: Vec<u8>) -> Result<reqwest::multipart::Part, Error> {
    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name("cover.jpg")
        .mime_str("image/jpeg")?)
}
