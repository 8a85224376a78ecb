use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::Error;

/// One release (a specific edition of an album) listened by the user.
///
/// An empty `release_mbid` means the release is unverified: ListenBrainz could
/// not link it to MusicBrainz. Such records are dropped by the pipeline before
/// formatting or media staging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub listen_count: u64,
    pub artist_mbids: Vec<String>,
    pub artist_name: String,
    pub release_mbid: String,
    pub release_name: String,
    #[serde(default)]
    pub covers: Vec<CoverImage>,
}

impl ReleaseRecord {
    pub fn is_verified(&self) -> bool {
        !self.release_mbid.is_empty()
    }

    /// URL of the "large" thumbnail of the first cover, if any.
    pub fn large_cover_url(&self) -> Option<&str> {
        self.covers
            .first()
            .and_then(|cover| cover.thumbnails.get(LARGE_THUMBNAIL))
            .map(String::as_str)
    }
}

pub const LARGE_THUMBNAIL: &str = "large";

/// A cover image as described by the Cover Art Archive.
///
/// `thumbnails` maps a size label ("small", "large", "250", "500", "1200") to
/// the thumbnail URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub back: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub thumbnails: HashMap<String, String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// The trailing time window of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Month,
    Year,
}

impl Period {
    /// Value of the `range` parameter of the ListenBrainz statistics API.
    pub fn as_range(&self) -> &'static str {
        match self {
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_range())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(Error::InvalidPeriod(other.to_string())),
        }
    }
}

/// How a platform wants its images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// The image has to be uploaded from a local file.
    LocalFile,
    /// The platform client fetches the image from its URL itself.
    RemoteUrl,
}

/// A cover ready to be attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedMedia {
    Local(PathBuf),
    Remote(String),
}

impl fmt::Display for StagedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagedMedia::Local(path) => write!(f, "{}", path.display()),
            StagedMedia::Remote(url) => f.write_str(url),
        }
    }
}

/// Outcome of a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostStatus {
    Published { id: String },
    DryRun,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserReleasesResponse {
    pub payload: UserReleasesPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserReleasesPayload {
    pub releases: Vec<ListenBrainzRelease>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenBrainzRelease {
    #[serde(default)]
    pub listen_count: u64,
    #[serde(default)]
    pub artist_mbids: Option<Vec<String>>,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub release_mbid: Option<String>,
    #[serde(default)]
    pub release_name: String,
}

impl From<ListenBrainzRelease> for ReleaseRecord {
    fn from(release: ListenBrainzRelease) -> Self {
        ReleaseRecord {
            listen_count: release.listen_count,
            artist_mbids: release.artist_mbids.unwrap_or_default(),
            artist_name: release.artist_name,
            release_mbid: release.release_mbid.unwrap_or_default(),
            release_name: release.release_name,
            covers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverArtResponse {
    #[serde(default)]
    pub images: Vec<CoverImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonAccount {
    pub id: String,
    #[serde(default)]
    pub acct: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonMedia {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonStatus {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterMedia {
    pub media_id_string: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTweetRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<TweetMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TweetMedia {
    pub media_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTweetResponse {
    pub data: CreatedTweet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
}

#[derive(Tabled)]
pub struct ConfigTableRow {
    pub key: String,
    pub value: String,
}
