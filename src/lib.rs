//! ListenBrainz to Mastodon and Twitter
//!
//! This library builds a periodic "top albums" report for a ListenBrainz user
//! and publishes it to social platforms. Releases are fetched from the
//! ListenBrainz statistics API, checked against MusicBrainz (only releases with
//! a MusicBrainz id survive), decorated with front covers from the Cover Art
//! Archive and finally rendered into a message that fits the platform limit.
//!
//! # Modules
//!
//! - `cli` - The report orchestrator driven by the binary
//! - `config` - Configuration loaded once from the environment and `.env`
//! - `download` - Plain file downloads with retries
//! - `error` - The crate wide error type
//! - `listenbrainz` - ListenBrainz statistics client
//! - `media` - Staging of cover images for upload
//! - `message` - Message formatting with length fallback
//! - `musicbrainz` - Cover Art Archive client
//! - `pipeline` - Fetch, dedupe, verify and truncate releases
//! - `retry` - Fixed count retry policy shared by all clients
//! - `social` - Mastodon and Twitter posting clients
//! - `types` - Data structures and type definitions
//! - `utils` - Small helpers used across modules

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod listenbrainz;
pub mod media;
pub mod message;
pub mod musicbrainz;
pub mod pipeline;
pub mod retry;
pub mod social;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} releases", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark.
///
/// Unlike a panic this keeps the process alive: the report run always
/// finishes and exits with status 0, failures are only printed.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a missing cover or an unknown locale.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
