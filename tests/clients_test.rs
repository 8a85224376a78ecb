mod common;

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use lbz2social::config::{MastodonCredentials, TwitterCredentials};
use lbz2social::error::Error;
use lbz2social::listenbrainz::{ListenBrainzClient, ReleaseSource};
use lbz2social::musicbrainz::{CoverArtClient, CoverSource};
use lbz2social::retry::RetryPolicy;
use lbz2social::social::{MastodonClient, Poster, TwitterClient};
use lbz2social::types::{Period, PostStatus, StagedMedia};
use reqwest::Client;
use serde_json::{Value, json};

fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

#[tokio::test]
async fn test_listenbrainz_top_releases() {
    let seen: Arc<Mutex<Option<(String, HashMap<String, String>)>>> = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route(
            "/1/stats/user/{user}/releases",
            get(
                |State(seen): State<Arc<Mutex<Option<(String, HashMap<String, String>)>>>>,
                 Path(user): Path<String>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    *seen.lock().unwrap() = Some((user, query));
                    Json(json!({
                        "payload": {
                            "releases": [
                                {
                                    "artist_mbids": ["a1"],
                                    "artist_name": "Artist X",
                                    "listen_count": 30,
                                    "release_mbid": "mbid1",
                                    "release_name": "Album A"
                                },
                                {
                                    "artist_mbids": [],
                                    "artist_name": "Artist Z",
                                    "listen_count": 20,
                                    "release_mbid": null,
                                    "release_name": "Mystery"
                                }
                            ]
                        }
                    }))
                },
            ),
        )
        .with_state(Arc::clone(&seen));
    let base = common::serve(app).await;

    let client = ListenBrainzClient::new(Client::new(), &base);
    let releases = client.top_releases("alice", 10, Period::Year).await.unwrap();

    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].release_name, "Album A");
    assert_eq!(releases[1].release_mbid, "");

    let (user, query) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(user, "alice");
    assert_eq!(query.get("count").map(String::as_str), Some("10"));
    assert_eq!(query.get("range").map(String::as_str), Some("year"));
    assert_eq!(query.get("offset").map(String::as_str), Some("0"));
}

#[tokio::test]
async fn test_listenbrainz_without_statistics_is_empty() {
    let app = Router::new()
        .route(
            "/1/stats/user/{user}/releases",
            get(|| async { StatusCode::NO_CONTENT }),
        );
    let base = common::serve(app).await;

    let client = ListenBrainzClient::new(Client::new(), &base);
    let releases = client.top_releases("alice", 10, Period::Month).await.unwrap();

    assert!(releases.is_empty());
}

#[tokio::test]
async fn test_listenbrainz_malformed_payload_is_empty() {
    let app = Router::new().route(
        "/1/stats/user/{user}/releases",
        get(|| async { Json(json!({"payload": {"count": 0}})) }),
    );
    let base = common::serve(app).await;

    let client = ListenBrainzClient::new(Client::new(), &base);
    let releases = client.top_releases("alice", 10, Period::Month).await.unwrap();

    assert!(releases.is_empty());
}

#[tokio::test]
async fn test_listenbrainz_server_error_is_reported() {
    let app = Router::new().route(
        "/1/stats/user/{user}/releases",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = common::serve(app).await;

    let client = ListenBrainzClient::new(Client::new(), &base);
    let err = client.top_releases("alice", 10, Period::Month).await.unwrap_err();

    assert!(matches!(err, Error::Server { .. }));
}

#[tokio::test]
async fn test_cover_art_keeps_front_covers_only() {
    let app = Router::new().route(
        "/release/{mbid}",
        get(|Path(mbid): Path<String>| async move {
            Json(json!({
                "release": format!("https://musicbrainz.org/release/{mbid}"),
                "images": [
                    {
                        "approved": true,
                        "back": true,
                        "front": false,
                        "comment": "",
                        "edit": 1,
                        "id": 1,
                        "image": "http://img/back.jpg",
                        "thumbnails": {"large": "http://img/back-500.jpg"},
                        "types": ["Back"]
                    },
                    {
                        "approved": true,
                        "back": false,
                        "front": true,
                        "comment": "",
                        "edit": 2,
                        "id": 2,
                        "image": "http://img/front.jpg",
                        "thumbnails": {
                            "250": "http://img/front-250.jpg",
                            "large": "http://img/front-500.jpg",
                            "small": "http://img/front-250.jpg"
                        },
                        "types": ["Front"]
                    }
                ]
            }))
        }),
    );
    let base = common::serve(app).await;

    let client = CoverArtClient::new(Client::new(), &base, fast_retry(3));
    let covers = client.front_covers("mbid1").await.unwrap();

    assert_eq!(covers.len(), 1);
    assert!(covers[0].front);
    assert_eq!(
        covers[0].thumbnails.get("large").map(String::as_str),
        Some("http://img/front-500.jpg")
    );
}

#[tokio::test]
async fn test_cover_art_missing_release_has_no_covers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/release/{mbid}",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }),
        )
        .with_state(Arc::clone(&hits));
    let base = common::serve(app).await;

    let client = CoverArtClient::new(Client::new(), &base, fast_retry(5));
    let covers = client.front_covers("mbid1").await.unwrap();

    assert!(covers.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cover_art_retries_server_errors() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/release/{mbid}",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                } else {
                    (StatusCode::OK, Json(json!({"images": []})))
                }
            }),
        )
        .with_state(Arc::clone(&hits));
    let base = common::serve(app).await;

    let client = CoverArtClient::new(Client::new(), &base, fast_retry(5));
    let covers = client.front_covers("mbid1").await.unwrap();

    assert!(covers.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cover_art_gives_up_after_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/release/{mbid}",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::BAD_GATEWAY
            }),
        )
        .with_state(Arc::clone(&hits));
    let base = common::serve(app).await;

    let client = CoverArtClient::new(Client::new(), &base, fast_retry(3));
    let err = client.front_covers("mbid1").await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[derive(Clone, Default)]
struct MastodonState {
    verify_hits: Arc<AtomicUsize>,
    media_hits: Arc<AtomicUsize>,
    status_hits: Arc<AtomicUsize>,
    failing_statuses: usize,
    reject_token: bool,
}

fn mastodon_app(state: MastodonState) -> Router {
    Router::new()
        .route(
            "/api/v1/accounts/verify_credentials",
            get(|State(state): State<MastodonState>, headers: HeaderMap| async move {
                state.verify_hits.fetch_add(1, Ordering::SeqCst);
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer secret-token");
                if state.reject_token || !authorized {
                    (StatusCode::UNAUTHORIZED, Json(json!({"error": "The access token is invalid"})))
                } else {
                    (StatusCode::OK, Json(json!({"id": "1", "acct": "alice"})))
                }
            }),
        )
        .route(
            "/api/v2/media",
            post(|State(state): State<MastodonState>| async move {
                let n = state.media_hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"id": format!("media{n}"), "type": "image"}))
            }),
        )
        .route(
            "/api/v1/statuses",
            post(|State(state): State<MastodonState>| async move {
                let n = state.status_hits.fetch_add(1, Ordering::SeqCst);
                if n < state.failing_statuses {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "busy"})))
                } else {
                    (StatusCode::OK, Json(json!({"id": "109", "content": "<p>hi</p>"})))
                }
            }),
        )
        .route("/cover.jpg", get(|| async { vec![0xffu8, 0xd8, 0xff, 0xe0] }))
        .route("/forbidden.jpg", get(|| async { StatusCode::FORBIDDEN }))
        .route("/missing.jpg", get(|| async { StatusCode::NOT_FOUND }))
        .with_state(state)
}

fn mastodon_client(base: &str, retry: RetryPolicy, debug: bool) -> MastodonClient {
    MastodonClient::new(
        Client::new(),
        MastodonCredentials {
            instance: base.to_string(),
            token: "secret-token".to_string(),
        },
        retry,
        fast_retry(1),
        debug,
    )
}

#[tokio::test]
async fn test_mastodon_posts_with_media_after_retries() {
    let state = MastodonState {
        failing_statuses: 2,
        ..Default::default()
    };
    let base = common::serve(mastodon_app(state.clone())).await;
    let client = mastodon_client(&base, fast_retry(5), false);
    let media = vec![
        StagedMedia::Remote(format!("{base}/cover.jpg")),
        StagedMedia::Remote(format!("{base}/cover.jpg")),
    ];

    let status = client.post("#TopAlbums in May", &media).await.unwrap();

    assert_eq!(
        status,
        PostStatus::Published {
            id: "109".to_string()
        }
    );
    assert_eq!(state.verify_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.media_hits.load(Ordering::SeqCst), 2);
    assert_eq!(state.status_hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_mastodon_skips_covers_the_image_host_refuses() {
    let state = MastodonState::default();
    let base = common::serve(mastodon_app(state.clone())).await;
    let client = mastodon_client(&base, fast_retry(3), false);
    let media = vec![
        StagedMedia::Remote(format!("{base}/forbidden.jpg")),
        StagedMedia::Remote(format!("{base}/missing.jpg")),
        StagedMedia::Remote(format!("{base}/cover.jpg")),
    ];

    let status = client.post("#TopAlbums in May", &media).await.unwrap();

    assert_eq!(
        status,
        PostStatus::Published {
            id: "109".to_string()
        }
    );
    assert_eq!(state.media_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.status_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mastodon_forbidden_cover_is_not_an_auth_error() {
    let state = MastodonState::default();
    let base = common::serve(mastodon_app(state.clone())).await;
    let client = mastodon_client(&base, fast_retry(3), false);

    let result = client
        .post("text", &[StagedMedia::Remote(format!("{base}/forbidden.jpg"))])
        .await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(state.media_hits.load(Ordering::SeqCst), 0);
    assert_eq!(state.status_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mastodon_rejected_token_is_not_retried() {
    let state = MastodonState {
        reject_token: true,
        ..Default::default()
    };
    let base = common::serve(mastodon_app(state.clone())).await;
    let client = mastodon_client(&base, fast_retry(5), false);

    let err = client.post("text", &[]).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(state.verify_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.status_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mastodon_exhausted_retries_fail() {
    let state = MastodonState {
        failing_statuses: usize::MAX,
        ..Default::default()
    };
    let base = common::serve(mastodon_app(state.clone())).await;
    let client = mastodon_client(&base, fast_retry(3), false);

    let err = client.post("text", &[]).await.unwrap_err();

    assert!(matches!(err, Error::Server { .. }));
    assert_eq!(state.status_hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_mastodon_debug_mode_makes_no_requests() {
    // nothing listens on this address
    let client = mastodon_client("http://127.0.0.1:9", fast_retry(1), true);

    let status = client.post("text", &[]).await.unwrap();

    assert_eq!(status, PostStatus::DryRun);
}

#[derive(Clone, Default)]
struct TwitterState {
    uploads: Arc<AtomicUsize>,
    tweets: Arc<Mutex<Vec<(String, Value)>>>,
}

fn twitter_app(state: TwitterState) -> Router {
    Router::new()
        .route(
            "/1.1/media/upload.json",
            post(|State(state): State<TwitterState>| async move {
                let n = state.uploads.fetch_add(1, Ordering::SeqCst);
                Json(json!({"media_id": 700 + n, "media_id_string": format!("{}", 700 + n)}))
            }),
        )
        .route(
            "/2/tweets",
            post(
                |State(state): State<TwitterState>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    state.tweets.lock().unwrap().push((auth, body));
                    (StatusCode::CREATED, Json(json!({"data": {"id": "1234", "text": "ok"}})))
                },
            ),
        )
        .with_state(state)
}

fn twitter_client(base: &str, debug: bool) -> TwitterClient {
    TwitterClient::new(
        Client::new(),
        TwitterCredentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            access_token: "at".to_string(),
            access_token_secret: "ats".to_string(),
        },
        base,
        base,
        fast_retry(3),
        fast_retry(1),
        debug,
    )
}

#[tokio::test]
async fn test_twitter_uploads_local_files_then_tweets() {
    let state = TwitterState::default();
    let base = common::serve(twitter_app(state.clone())).await;
    let client = twitter_client(&base, false);

    let cover = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(cover.path(), [0xffu8, 0xd8, 0xff]).unwrap();
    let media = vec![StagedMedia::Local(cover.path().to_path_buf())];

    let status = client.post("#TopAlbums in May", &media).await.unwrap();

    assert_eq!(
        status,
        PostStatus::Published {
            id: "1234".to_string()
        }
    );
    assert_eq!(state.uploads.load(Ordering::SeqCst), 1);

    let tweets = state.tweets.lock().unwrap();
    assert_eq!(tweets.len(), 1);
    let (auth, body) = &tweets[0];
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_signature_method=\"HMAC-SHA1\""));
    assert_eq!(body["text"], "#TopAlbums in May");
    assert_eq!(body["media"]["media_ids"], json!(["700"]));
}

#[tokio::test]
async fn test_twitter_text_only_tweet_has_no_media() {
    let state = TwitterState::default();
    let base = common::serve(twitter_app(state.clone())).await;
    let client = twitter_client(&base, false);

    client.post("just text", &[]).await.unwrap();

    let tweets = state.tweets.lock().unwrap();
    assert!(tweets[0].1.get("media").is_none());
    assert_eq!(state.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_twitter_attaches_at_most_four_images() {
    let state = TwitterState::default();
    let base = common::serve(twitter_app(state.clone())).await;
    let client = twitter_client(&base, false);

    let cover = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(cover.path(), [1u8, 2, 3]).unwrap();
    let media: Vec<StagedMedia> = (0..6)
        .map(|_| StagedMedia::Local(cover.path().to_path_buf()))
        .collect();

    client.post("text", &media).await.unwrap();

    assert_eq!(state.uploads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_twitter_skips_unreadable_files() {
    let state = TwitterState::default();
    let base = common::serve(twitter_app(state.clone())).await;
    let client = twitter_client(&base, false);

    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.jpg");
    std::fs::write(&cover, [1u8, 2, 3]).unwrap();
    let media = vec![
        StagedMedia::Local(dir.path().join("gone.jpg")),
        StagedMedia::Local(cover),
    ];

    client.post("text", &media).await.unwrap();

    assert_eq!(state.uploads.load(Ordering::SeqCst), 1);
    let tweets = state.tweets.lock().unwrap();
    assert_eq!(tweets[0].1["media"]["media_ids"], json!(["700"]));
}

#[tokio::test]
async fn test_twitter_debug_mode_makes_no_requests() {
    let client = twitter_client("http://127.0.0.1:9", true);
    assert_eq!(client.post("text", &[]).await.unwrap(), PostStatus::DryRun);
}
