use std::io;

use reqwest::Client;
use tempfile::TempPath;

use crate::{
    download,
    error::Error,
    retry::RetryPolicy,
    types::{MediaKind, ReleaseRecord, StagedMedia},
    warning,
};

/// Covers staged for one post.
///
/// Local files are temp files owned by this value: they are removed when it is
/// dropped, whether the post went through or not, or earlier by
/// [`StagedCovers::close`].
#[derive(Debug, Default)]
pub struct StagedCovers {
    items: Vec<StagedMedia>,
    temp_files: Vec<TempPath>,
}

impl StagedCovers {
    pub fn items(&self) -> &[StagedMedia] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Removes the local files now and reports the first file that could not
    /// be removed. Every file is attempted.
    pub fn close(self) -> io::Result<()> {
        let mut result = Ok(());
        for file in self.temp_files {
            if let Err(e) = file.close() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

/// Downloads `url` into a fresh temp file named after the cover `rank`.
///
/// The file is gone again when the download fails.
async fn download_cover(
    client: &Client,
    url: &str,
    rank: usize,
    retry: &RetryPolicy,
) -> Result<TempPath, Error> {
    let path = tempfile::Builder::new()
        .prefix(&format!("{}_cover_{}_", env!("CARGO_PKG_NAME"), rank))
        .suffix(".jpg")
        .tempfile()?
        .into_temp_path();
    download::download_to_file(client, url, &path, retry).await?;
    Ok(path)
}

/// Stages the large thumbnail of the first cover of each release.
///
/// # Arguments
///
/// * `releases` - Verified releases in rank order
/// * `kind` - How the target platform wants its images
/// * `client` - HTTP client used for the downloads
/// * `retry` - Retry policy of every single download
///
/// # Returns
///
/// One [`StagedMedia`] per release with a usable cover, in rank order. With
/// [`MediaKind::RemoteUrl`] the thumbnail URL is passed through untouched;
/// with [`MediaKind::LocalFile`] it is downloaded to a uniquely named temp
/// file that lives as long as the returned [`StagedCovers`].
///
/// Releases without covers or without a "large" thumbnail are skipped, as are
/// covers that fail to download. Nothing here is an error.
///
/// # Example
///
/// ```
/// let staged = stage_covers(&releases, MediaKind::LocalFile, &client, &retry).await;
/// twitter.post(&message, staged.items()).await?;
/// // temp files are removed here
/// drop(staged);
/// ```
pub async fn stage_covers(
    releases: &[ReleaseRecord],
    kind: MediaKind,
    client: &Client,
    retry: &RetryPolicy,
) -> StagedCovers {
    let mut staged = StagedCovers::default();

    for (rank, release) in releases.iter().enumerate() {
        let Some(url) = release.large_cover_url() else {
            continue;
        };

        match kind {
            MediaKind::RemoteUrl => staged.items.push(StagedMedia::Remote(url.to_string())),
            MediaKind::LocalFile => match download_cover(client, url, rank + 1, retry).await {
                Ok(path) => {
                    staged.items.push(StagedMedia::Local(path.to_path_buf()));
                    staged.temp_files.push(path);
                }
                Err(e) => warning!("Cannot download cover {}: {}", url, e),
            },
        }
    }

    staged
}
