use crate::{
    error::Error,
    listenbrainz::ReleaseSource,
    musicbrainz::CoverSource,
    types::{Period, ReleaseRecord},
    utils, warning,
};

/// Parameters of one pipeline run.
#[derive(Debug, Clone)]
pub struct ReleaseQuery<'a> {
    pub user: &'a str,
    /// How many ranked releases to ask for. Should be comfortably larger than
    /// `verified_count` since unverified entries get dropped.
    pub request_count: u32,
    pub verified_count: usize,
    pub period: Period,
}

/// Dedupes, drops unverified releases and keeps the first `verified_count`.
pub fn select_verified(mut releases: Vec<ReleaseRecord>, verified_count: usize) -> Vec<ReleaseRecord> {
    utils::remove_duplicate_releases(&mut releases);
    utils::remove_unverified_releases(&mut releases);
    releases.truncate(verified_count);
    releases
}

/// Fetches the ranked releases of the period, unfiltered.
pub async fn fetch_releases<H: ReleaseSource>(
    history: &H,
    query: &ReleaseQuery<'_>,
) -> Result<Vec<ReleaseRecord>, Error> {
    history
        .top_releases(query.user, query.request_count, query.period)
        .await
}

/// Fills in the front covers of every release.
///
/// A failed lookup leaves that release without covers; the report can still be
/// posted as text.
pub async fn attach_covers<C: CoverSource>(covers: &C, releases: &mut [ReleaseRecord]) {
    for release in releases.iter_mut() {
        match covers.front_covers(&release.release_mbid).await {
            Ok(images) => release.covers = images,
            Err(e) => warning!(
                "Cannot fetch covers for \"{}\" ({}): {}",
                release.release_name,
                release.release_mbid,
                e
            ),
        }
    }
}

/// Fetch, dedupe, verify, truncate and decorate with covers, in that order.
pub async fn fetch_top_releases<H: ReleaseSource, C: CoverSource>(
    history: &H,
    covers: &C,
    query: &ReleaseQuery<'_>,
) -> Result<Vec<ReleaseRecord>, Error> {
    let releases = fetch_releases(history, query).await?;
    let mut releases = select_verified(releases, query.verified_count);
    attach_covers(covers, &mut releases).await;
    Ok(releases)
}
