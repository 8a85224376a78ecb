//! # ListenBrainz Module
//!
//! Client for the ListenBrainz statistics API. Only the "top releases of a
//! user" endpoint is used:
//!
//! - `GET /1/stats/user/{user}/releases?count=N&offset=0&range=month|year`
//!
//! ListenBrainz answers `204 No Content` while statistics are still being
//! computed and may omit or mangle the payload. Any answer that does not carry
//! a `payload.releases` array is read as zero releases so that the report
//! degrades to "nothing to post" instead of failing.

use reqwest::Client;
use serde_json::Value;

use crate::{
    error::{Error, check_status},
    types::{ListenBrainzRelease, Period, ReleaseRecord},
    warning,
};

/// Something that ranks the releases a user listened to.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    async fn top_releases(
        &self,
        user: &str,
        count: u32,
        period: Period,
    ) -> Result<Vec<ReleaseRecord>, Error>;
}

pub struct ListenBrainzClient {
    client: Client,
    base_url: String,
}

impl ListenBrainzClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl ReleaseSource for ListenBrainzClient {
    async fn top_releases(
        &self,
        user: &str,
        count: u32,
        period: Period,
    ) -> Result<Vec<ReleaseRecord>, Error> {
        let api_url = format!(
            "{url}/1/stats/user/{user}/releases?count={count}&offset=0&range={range}",
            url = self.base_url,
            user = urlencoding::encode(user),
            count = count,
            range = period.as_range()
        );

        let response = self.client.get(&api_url).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;

        Ok(parse_releases(&body))
    }
}

/// Reads the releases out of a statistics payload.
///
/// Anything that is not a JSON object with a `payload.releases` array yields
/// an empty list. Entries that cannot be read are skipped.
pub fn parse_releases(body: &str) -> Vec<ReleaseRecord> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) => return Vec::new(),
    };

    let Some(items) = json
        .get("payload")
        .and_then(|payload| payload.get("releases"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            match serde_json::from_value::<ListenBrainzRelease>(item.clone()) {
                Ok(release) => Some(ReleaseRecord::from(release)),
                Err(e) => {
                    warning!("Skipping unreadable ListenBrainz release: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_release_entries() {
        let body = r#"{
            "payload": {
                "count": 2,
                "range": "month",
                "releases": [
                    {
                        "artist_mbids": ["a1"],
                        "artist_name": "Artist X",
                        "listen_count": 31,
                        "release_mbid": "mbid1",
                        "release_name": "Album A"
                    },
                    {
                        "artist_mbids": null,
                        "artist_name": "Some Podcast",
                        "listen_count": 12,
                        "release_mbid": null,
                        "release_name": "Episode 7"
                    }
                ]
            }
        }"#;

        let releases = parse_releases(body);

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].release_mbid, "mbid1");
        assert_eq!(releases[0].artist_mbids, vec!["a1".to_string()]);
        assert_eq!(releases[0].listen_count, 31);
        assert_eq!(releases[1].release_mbid, "");
        assert!(releases[1].artist_mbids.is_empty());
        assert!(releases.iter().all(|r| r.covers.is_empty()));
    }

    #[test]
    fn malformed_payloads_are_empty() {
        for body in [
            "",
            "not json",
            "null",
            "[]",
            r#"{"error": "nope"}"#,
            r#"{"payload": null}"#,
            r#"{"payload": {"releases": "x"}}"#,
        ] {
            assert!(parse_releases(body).is_empty(), "{body}");
        }
    }
}
