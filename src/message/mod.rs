//! # Message Module
//!
//! Renders the list of top releases into a status message that fits a
//! platform's character limit.
//!
//! Every locale provides templates for three tiers (`Normal`, `Short`,
//! `Shorter`). The tiers are tried in order and the first rendering whose
//! length is within the limit wins. When not even the `Shorter` rendering
//! fits, it is cut hard at the limit. Lengths are counted in characters.
//!
//! ```text
//! #TopAlbums in September
//! 1. Album A (by Artist X)
//! 2. Album B (by Artist Y)
//! ```

mod templates;

use std::cell::Cell;

use chrono::{Datelike, Local, Months, NaiveDate, NaiveTime};

pub use templates::{FALLBACK_LOCALE, HeadingArity, Templates, Tier};

use crate::{
    types::{Period, ReleaseRecord},
    utils, warning,
};

/// Twitter's limit, used for every platform.
pub const MAX_MESSAGE_LENGTH: usize = 280;

pub struct MessageFormatter {
    locale: String,
    verified_count: usize,
    today: NaiveDate,
    warned: Cell<bool>,
}

impl MessageFormatter {
    /// A formatter for `locale` (e.g. `en_GB.UTF-8`) whose heading announces
    /// `verified_count` releases. Periods are relative to today.
    pub fn new(locale: &str, verified_count: usize) -> Self {
        Self {
            locale: locale.to_string(),
            verified_count,
            today: Local::now().date_naive(),
            warned: Cell::new(false),
        }
    }

    /// Uses `today` instead of the current date to derive period labels.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Renders `releases` with the most verbose tier that fits in `max_length`
    /// characters, or the hard-cut `Shorter` rendering when none does.
    ///
    /// An empty list gives an empty message.
    pub fn format(&self, releases: &[ReleaseRecord], period: Period, max_length: usize) -> String {
        if releases.is_empty() {
            return String::new();
        }

        let mut candidate = String::new();
        for tier in Tier::ALL {
            candidate = self.render(releases, period, tier);
            if candidate.chars().count() <= max_length {
                return candidate;
            }
        }

        utils::truncate_chars(&candidate, max_length)
    }

    /// Renders `releases` with the templates of a single tier.
    pub fn render(&self, releases: &[ReleaseRecord], period: Period, tier: Tier) -> String {
        if releases.is_empty() {
            return String::new();
        }

        let templates = self.templates(tier);
        let mut message = self.heading(templates, period);
        for (rank, release) in releases.iter().enumerate() {
            message.push_str(&templates.render_line(
                rank + 1,
                &release.release_name,
                &release.artist_name,
            ));
        }

        message.trim().to_string()
    }

    fn heading(&self, templates: &Templates, period: Period) -> String {
        templates.render_heading(self.verified_count, &self.period_label(period))
    }

    /// Name of the previous month, or the previous year, in the template locale.
    pub fn period_label(&self, period: Period) -> String {
        match period {
            Period::Month => {
                let last_month = self
                    .today
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(self.today);
                last_month
                    .and_time(NaiveTime::MIN)
                    .and_utc()
                    .format_localized("%B", templates::time_locale(self.template_locale()))
                    .to_string()
            }
            Period::Year => (self.today.year() - 1).to_string(),
        }
    }

    fn template_locale(&self) -> &str {
        if Tier::ALL
            .iter()
            .all(|tier| templates::lookup(*tier, &self.locale).is_some())
        {
            &self.locale
        } else {
            FALLBACK_LOCALE
        }
    }

    fn templates(&self, tier: Tier) -> &'static Templates {
        if let Some(templates) = templates::lookup(tier, &self.locale) {
            return templates;
        }

        if !self.warned.replace(true) {
            warning!(
                "Locale \"{}\" not found, using \"{}\" instead",
                self.locale,
                FALLBACK_LOCALE
            );
        }

        templates::lookup(tier, FALLBACK_LOCALE).unwrap_or(&DEFAULT_TEMPLATES)
    }
}

static DEFAULT_TEMPLATES: Templates = Templates {
    heading: "#TopAlbums in {period}\n",
    arity: HeadingArity::Period,
    line: "{rank} {release} ({artist})\n",
};

/// One-shot formatting relative to today.
///
/// # Arguments
///
/// * `releases` - Verified releases in rank order
/// * `period` - The period the heading names
/// * `locale` - Template locale, e.g. `es_ES.UTF-8`
/// * `verified_count` - The configured number of kept releases (`LB_VERIFIED`),
///   announced by headings that have a `{count}` slot
/// * `max_length` - Character limit of the result
pub fn format_message(
    releases: &[ReleaseRecord],
    period: Period,
    locale: &str,
    verified_count: usize,
    max_length: usize,
) -> String {
    MessageFormatter::new(locale, verified_count).format(releases, period, max_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_announces_the_configured_count() {
        let templates = Templates {
            heading: "Top {count} of {period}\n",
            arity: HeadingArity::CountAndPeriod,
            line: "{rank} {release}\n",
        };
        let formatter = MessageFormatter::new("en_GB.UTF-8", 5)
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        assert_eq!(formatter.heading(&templates, Period::Year), "Top 5 of 2023\n");
    }
}
