use std::path::Path;

use reqwest::Client;

use crate::{
    error::{Error, check_status},
    retry::RetryPolicy,
};

/// Fetches `url` into memory, retrying transient failures.
pub async fn fetch_bytes(client: &Client, url: &str, retry: &RetryPolicy) -> Result<Vec<u8>, Error> {
    retry
        .run_transient(|| async move {
            let response = check_status(client.get(url).send().await?).await?;
            Ok::<_, Error>(response.bytes().await?.to_vec())
        })
        .await
}

/// Downloads `url` to `path`, overwriting any existing file.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    path: &Path,
    retry: &RetryPolicy,
) -> Result<(), Error> {
    let bytes = fetch_bytes(client, url, retry).await?;
    async_fs::write(path, bytes).await?;
    Ok(())
}
