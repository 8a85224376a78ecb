use reqwest::{Client, header::AUTHORIZATION, multipart::Form};

use crate::{
    config::TwitterCredentials,
    error::{Error, check_status},
    retry::RetryPolicy,
    social::{MAX_MEDIA, Poster, cover_bytes, image_part, oauth::OAuthSigner},
    types::{
        CreateTweetRequest, CreateTweetResponse, MediaKind, PostStatus, StagedMedia, TweetMedia,
        TwitterMedia,
    },
};

pub struct TwitterClient {
    client: Client,
    credentials: TwitterCredentials,
    api_url: String,
    upload_url: String,
    retry: RetryPolicy,
    download_retry: RetryPolicy,
    debug: bool,
}

impl TwitterClient {
    pub fn new(
        client: Client,
        credentials: TwitterCredentials,
        api_url: &str,
        upload_url: &str,
        retry: RetryPolicy,
        download_retry: RetryPolicy,
        debug: bool,
    ) -> Self {
        Self {
            client,
            credentials,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            retry,
            download_retry,
            debug,
        }
    }

    fn signer(&self) -> OAuthSigner<'_> {
        OAuthSigner::new(&self.credentials)
    }

    /// Uploads one image and returns its media id.
    pub async fn upload_media(&self, bytes: Vec<u8>) -> Result<String, Error> {
        let api_url = format!("{}/1.1/media/upload.json", self.upload_url);
        self.retry
            .run_transient(|| async {
                let form = Form::new().part("media", image_part(bytes.clone())?);
                let response = self
                    .client
                    .post(&api_url)
                    .header(AUTHORIZATION, self.signer().authorization("POST", &api_url, &[]))
                    .multipart(form)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, Error>(response.json::<TwitterMedia>().await?.media_id_string)
            })
            .await
    }

    pub async fn create_tweet(&self, text: &str, media_ids: Vec<String>) -> Result<String, Error> {
        let api_url = format!("{}/2/tweets", self.api_url);
        let request = CreateTweetRequest {
            text: text.to_string(),
            media: (!media_ids.is_empty()).then_some(TweetMedia { media_ids }),
        };

        self.retry
            .run_transient(|| async {
                let response = self
                    .client
                    .post(&api_url)
                    .header(AUTHORIZATION, self.signer().authorization("POST", &api_url, &[]))
                    .json(&request)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, Error>(response.json::<CreateTweetResponse>().await?.data.id)
            })
            .await
    }
}

impl Poster for TwitterClient {
    fn name(&self) -> &'static str {
        "Twitter"
    }

    fn post_noun(&self) -> &'static str {
        "tweet"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::LocalFile
    }

    async fn post(&self, text: &str, media: &[StagedMedia]) -> Result<PostStatus, Error> {
        if self.debug {
            return Ok(PostStatus::DryRun);
        }

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

        let id = self.create_tweet(text, media_ids).await?;
        Ok(PostStatus::Published { id })
    }
}
