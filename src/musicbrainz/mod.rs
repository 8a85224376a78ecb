//! # MusicBrainz Module
//!
//! Cover lookups for verified releases through the Cover Art Archive, the
//! image store of MusicBrainz:
//!
//! - `GET /release/{mbid}` - every image of a release with its thumbnails
//!
//! Only front covers are kept. A release without any artwork answers with
//! `404 Not Found`, which is an empty result rather than an error. Server side
//! failures are retried with the download policy.

use reqwest::{Client, StatusCode};

use crate::{
    error::{Error, check_status},
    retry::RetryPolicy,
    types::{CoverArtResponse, CoverImage},
};

/// User-Agent sent to MusicBrainz services, which reject anonymous clients.
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " ( ",
    env!("CARGO_PKG_DESCRIPTION"),
    " )"
);

/// Something that knows the front covers of a release.
#[allow(async_fn_in_trait)]
pub trait CoverSource {
    async fn front_covers(&self, release_mbid: &str) -> Result<Vec<CoverImage>, Error>;
}

pub struct CoverArtClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CoverArtClient {
    pub fn new(client: Client, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    async fn fetch(&self, api_url: &str) -> Result<Vec<CoverImage>, Error> {
        let response = self.client.get(api_url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = check_status(response).await?;
        let json = response.json::<CoverArtResponse>().await?;

        Ok(json.images.into_iter().filter(|image| image.front).collect())
    }
}

impl CoverSource for CoverArtClient {
    async fn front_covers(&self, release_mbid: &str) -> Result<Vec<CoverImage>, Error> {
        if release_mbid.is_empty() {
            return Ok(Vec::new());
        }

        let api_url = format!(
            "{url}/release/{mbid}",
            url = self.base_url,
            mbid = urlencoding::encode(release_mbid)
        );

        self.retry.run_transient(|| self.fetch(&api_url)).await
    }
}
