//! Configuration management for the report runner.
//!
//! Values come from environment variables and from a `.env` file in the local
//! data directory. They are read exactly once into a [`Config`] that is passed
//! to every component, so nothing below the entry point looks at the
//! environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{error::Error, retry::RetryPolicy};

pub const DEFAULT_LOCALE: &str = "en_GB.UTF-8";
pub const DEFAULT_LISTENBRAINZ_URL: &str = "https://api.listenbrainz.org";
pub const DEFAULT_COVERART_URL: &str = "https://coverartarchive.org";
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";
pub const DEFAULT_TWITTER_UPLOAD_URL: &str = "https://upload.twitter.com";

const ON_VALUES: [&str; 5] = ["1", "true", "on", "yes", "y"];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up in:
/// - Linux: `~/.local/share/lbz2social/.env`
/// - macOS: `~/Library/Application Support/lbz2social/.env`
/// - Windows: `%LOCALAPPDATA%/lbz2social/.env`
///
/// Variables already present in the process environment are not overridden.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// read or parsed. A missing file is an error too; callers usually only warn.
pub async fn load_env() -> Result<PathBuf, String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(path)
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(concat!(env!("CARGO_PKG_NAME"), "/.env"));
    path
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MastodonCredentials {
    pub instance: String,
    pub token: String,
}

/// Runtime configuration, built once at start up.
///
/// Every component gets what it needs from here; nothing below the entry
/// point reads the environment.
///
/// # Variables
///
/// | Variable | Field | Default |
/// |----------|-------|---------|
/// | `DEBUG` | `debug` | off (`1`, `true`, `on`, `yes`, `y` enable it) |
/// | `LOCALE` | `locale` | `en_GB.UTF-8` |
/// | `LB_USER` | `lb_user` | required |
/// | `LB_FETCH` / `LB_VERIFIED` | `lb_fetch` / `lb_verified` | 10 / 3 |
/// | `DL_RETRIES` / `DL_DELAY` | `download_retry` | 5 attempts, 5 s |
/// | `MSG_RETRIES` / `MSG_DELAY` | `message_retry` | 5 attempts, 5 s |
/// | `TW_CONSUMER_KEY`, `TW_CONSUMER_SECRET`, `TW_ACCESS_TOKEN`, `TW_ACCESS_TOKEN_SECRET` | `twitter` | unset |
/// | `MA_INSTANCE`, `MA_TOKEN` | `mastodon` | unset |
/// | `LB_API_URL`, `CAA_API_URL`, `TW_API_URL`, `TW_UPLOAD_URL` | `*_url` | public endpoints |
///
/// A platform with any credential missing is not configured, which is not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Dry-run mode: nothing is posted.
    pub debug: bool,
    pub locale: String,
    pub lb_user: String,
    /// Releases requested from ListenBrainz, before verification.
    pub lb_fetch: u32,
    /// Releases kept after verification.
    pub lb_verified: usize,
    pub download_retry: RetryPolicy,
    pub message_retry: RetryPolicy,
    pub twitter: Option<TwitterCredentials>,
    pub mastodon: Option<MastodonCredentials>,
    pub listenbrainz_url: String,
    pub coverart_url: String,
    pub twitter_api_url: String,
    pub twitter_upload_url: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the raw value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when `LB_USER` is missing or blank, or when a numeric
    /// setting is not an integer that fits its field.
    ///
    /// # Example
    ///
    /// ```
    /// let vars = HashMap::from([("LB_USER".to_string(), "alice".to_string())]);
    /// let config = Config::from_lookup(|key| vars.get(key).cloned())?;
    /// assert_eq!(config.lb_verified, 3);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_string())
        };
        let lb_user = text("LB_USER", "").trim().to_string();
        if lb_user.is_empty() {
            return Err(Error::Config("LB_USER must be set".to_string()));
        }

        let twitter = match (
            non_empty(lookup("TW_CONSUMER_KEY")),
            non_empty(lookup("TW_CONSUMER_SECRET")),
            non_empty(lookup("TW_ACCESS_TOKEN")),
            non_empty(lookup("TW_ACCESS_TOKEN_SECRET")),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)) => {
                Some(TwitterCredentials {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_token_secret,
                })
            }
            _ => None,
        };

        let mastodon = match (non_empty(lookup("MA_INSTANCE")), non_empty(lookup("MA_TOKEN"))) {
            (Some(instance), Some(token)) => Some(MastodonCredentials {
                instance: instance.trim_end_matches('/').to_string(),
                token,
            }),
            _ => None,
        };

        Ok(Self {
            debug: is_on(&text("DEBUG", "False")),
            locale: text("LOCALE", DEFAULT_LOCALE),
            lb_user,
            lb_fetch: number(&lookup, "LB_FETCH", 10)?,
            lb_verified: number(&lookup, "LB_VERIFIED", 3)?,
            download_retry: RetryPolicy::new(
                number(&lookup, "DL_RETRIES", 5)?,
                Duration::from_secs(number(&lookup, "DL_DELAY", 5)?),
            ),
            message_retry: RetryPolicy::new(
                number(&lookup, "MSG_RETRIES", 5)?,
                Duration::from_secs(number(&lookup, "MSG_DELAY", 5)?),
            ),
            twitter,
            mastodon,
            listenbrainz_url: base_url(text("LB_API_URL", DEFAULT_LISTENBRAINZ_URL)),
            coverart_url: base_url(text("CAA_API_URL", DEFAULT_COVERART_URL)),
            twitter_api_url: base_url(text("TW_API_URL", DEFAULT_TWITTER_API_URL)),
            twitter_upload_url: base_url(text("TW_UPLOAD_URL", DEFAULT_TWITTER_UPLOAD_URL)),
        })
    }
}

/// Reads an integer setting in the field's own type, so out of range values
/// are rejected instead of wrapped. Unset or blank gives `default`.
fn number<T, F>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            Error::Config(format!(
                "{key} must be a non-negative integer in range, got \"{raw}\""
            ))
        }),
        None => Ok(default),
    }
}

fn is_on(value: &str) -> bool {
    ON_VALUES.contains(&value.trim().to_lowercase().as_str())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
