use reqwest::{Client, multipart::Form};

use crate::{
    config::MastodonCredentials,
    error::{Error, check_status},
    retry::RetryPolicy,
    social::{MAX_MEDIA, Poster, cover_bytes, image_part},
    types::{MastodonAccount, MastodonMedia, MastodonStatus, MediaKind, PostStatus, StagedMedia},
};

pub struct MastodonClient {
    client: Client,
    credentials: MastodonCredentials,
    retry: RetryPolicy,
    download_retry: RetryPolicy,
    debug: bool,
}

impl MastodonClient {
    pub fn new(
        client: Client,
        credentials: MastodonCredentials,
        retry: RetryPolicy,
        download_retry: RetryPolicy,
        debug: bool,
    ) -> Self {
        Self {
            client,
            credentials,
            retry,
            download_retry,
            debug,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.credentials.instance.trim_end_matches('/'),
            path
        )
    }

    /// Checks the token by asking who it belongs to.
    pub async fn verify_credentials(&self) -> Result<MastodonAccount, Error> {
        let api_url = self.url("/api/v1/accounts/verify_credentials");
        self.retry
            .run_transient(|| async {
                let response = self
                    .client
                    .get(&api_url)
                    .bearer_auth(&self.credentials.token)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, Error>(response.json::<MastodonAccount>().await?)
            })
            .await
    }

    pub async fn upload_media(&self, bytes: Vec<u8>) -> Result<String, Error> {
        let api_url = self.url("/api/v2/media");
        self.retry
            .run_transient(|| async {
                let form = Form::new().part("file", image_part(bytes.clone())?);
                let response = self
                    .client
                    .post(&api_url)
                    .bearer_auth(&self.credentials.token)
                    .multipart(form)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, Error>(response.json::<MastodonMedia>().await?.id)
            })
            .await
    }

    pub async fn post_status(&self, text: &str, media_ids: &[String]) -> Result<String, Error> {
        let api_url = self.url("/api/v1/statuses");
        let mut fields: Vec<(&str, &str)> = vec![("status", text)];
        fields.extend(media_ids.iter().map(|id| ("media_ids[]", id.as_str())));

        self.retry
            .run_transient(|| async {
                let response = self
                    .client
                    .post(&api_url)
                    .bearer_auth(&self.credentials.token)
                    .form(&fields)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, Error>(response.json::<MastodonStatus>().await?.id)
            })
            .await
    }
}

impl Poster for MastodonClient {
    fn name(&self) -> &'static str {
        "Mastodon"
    }

    fn post_noun(&self) -> &'static str {
        "toot"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::RemoteUrl
    }

    async fn post(&self, text: &str, media: &[StagedMedia]) -> Result<PostStatus, Error> {
        if self.debug {
            return Ok(PostStatus::DryRun);
        }

        self.verify_credentials().await?;

        let mut media_ids = Vec::new();
        for item in media {
            if media_ids.len() == MAX_MEDIA {
                break;
            }
            // a cover that cannot be read is dropped, the status still goes out
            let Some(bytes) = cover_bytes(&self.client, item, &self.download_retry).await else {
                continue;
            };
            media_ids.push(self.upload_media(bytes).await?);
        }

        let id = self.post_status(text, &media_ids).await?;
        Ok(PostStatus::Published { id })
    }
}
