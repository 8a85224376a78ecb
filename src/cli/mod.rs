//! # CLI Module
//!
//! The report orchestrator. A run prints a banner, then builds the report of
//! the previous month and, in January only, the report of the previous year.
//!
//! ## Report Flow
//!
//! ```text
//! ListenBrainz (top releases)
//!     ↓
//! dedupe → drop unverified → keep top N
//!     ↓
//! Cover Art Archive (front covers)
//!     ↓
//! MessageFormatter (tier fallback, 280 characters)
//!     ↓
//! Mastodon, then Twitter
//! ```
//!
//! Each step prints a fixed-width label followed by `DONE!`, `SKIPPED!` or
//! `ERROR! <detail>`. Nothing here aborts the process: failures are printed
//! and the run goes on with whatever is left.

mod debug;
mod report;

use std::time::Duration;

use chrono::{Datelike, Local};
use reqwest::Client;

pub use debug::config_table;
pub use report::{Platforms, SendOutcome, preview, report, send};

use crate::{
    config::Config,
    error::Error,
    info,
    listenbrainz::ListenBrainzClient,
    musicbrainz::{CoverArtClient, USER_AGENT},
    success,
    types::Period,
    utils::WIDTH,
};

pub const PROGRAM_NAME: &str = "ListenBrainz to Mastodon and Twitter";

pub fn http_client() -> Result<Client, Error> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Runs the reports due today.
pub async fn run(config: &Config) -> Result<(), Error> {
    println!(
        "{} - v{}\n{}",
        PROGRAM_NAME,
        env!("CARGO_PKG_VERSION"),
        "=".repeat(WIDTH)
    );

    if config.debug {
        println!("DEBUG INFORMATION\n{}", config_table(config));
    }

    let client = http_client()?;
    let history = ListenBrainzClient::new(client.clone(), &config.listenbrainz_url);
    let covers = CoverArtClient::new(client.clone(), &config.coverart_url, config.download_retry);
    let mut platforms = Platforms::from_config(config, &client);

    if platforms.is_empty() {
        info!("No platform configured, the report will only be printed.");
    }

    let periods = due_periods(Local::now().month());
    for &period in &periods {
        let title = match period {
            Period::Month => "Last month report",
            Period::Year => "Last year report",
        };
        println!("\n{}\n{}", title, "-".repeat(WIDTH));
        report(config, &history, &covers, &mut platforms, &client, period).await;
    }

    println!();
    success!("{} report(s) done for {}.", periods.len(), config.lb_user);
    Ok(())
}

/// The monthly report always runs, the yearly one only in January.
pub fn due_periods(month: u32) -> Vec<Period> {
    if month == 1 {
        vec![Period::Month, Period::Year]
    } else {
        vec![Period::Month]
    }
}
