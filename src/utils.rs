use std::collections::HashSet;

use rand::{Rng, distr::Alphanumeric};

use crate::types::ReleaseRecord;

/// Width of the fixed-width progress labels.
pub const WIDTH: usize = 58;

pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Drops later occurrences of a release id, keeping the first one in place.
///
/// Records without a release id never count as duplicates of each other.
pub fn remove_duplicate_releases(releases: &mut Vec<ReleaseRecord>) {
    let mut seen_ids = HashSet::new();
    releases.retain(|release| {
        release.release_mbid.is_empty() || seen_ids.insert(release.release_mbid.clone())
    });
}

pub fn remove_unverified_releases(releases: &mut Vec<ReleaseRecord>) {
    releases.retain(ReleaseRecord::is_verified);
}

/// Pads `label` with dots up to [`WIDTH`] columns.
pub fn pad_label(label: &str) -> String {
    format!("{label:.<width$}", width = WIDTH)
}

/// Keeps the last four characters of a secret visible.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "*".repeat(secret.chars().count())
    } else {
        format!("****{visible}")
    }
}

/// Cuts `text` after `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
