#![allow(dead_code)]

use std::collections::HashMap;

use axum::Router;
use lbz2social::config::Config;
use lbz2social::types::{CoverImage, ReleaseRecord};

/// Serves `app` on a random local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn release(mbid: &str, name: &str, artist: &str) -> ReleaseRecord {
    ReleaseRecord {
        listen_count: 1,
        artist_mbids: Vec::new(),
        artist_name: artist.to_string(),
        release_mbid: mbid.to_string(),
        release_name: name.to_string(),
        covers: Vec::new(),
    }
}

pub fn front_cover(large: Option<&str>) -> CoverImage {
    let mut thumbnails = HashMap::new();
    thumbnails.insert("small".to_string(), "http://invalid/small.jpg".to_string());
    if let Some(url) = large {
        thumbnails.insert("large".to_string(), url.to_string());
    }
    CoverImage {
        approved: true,
        front: true,
        back: false,
        image: "http://invalid/full.jpg".to_string(),
        thumbnails,
        types: vec!["Front".to_string()],
    }
}

pub fn config(pairs: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("LB_USER".to_string(), "alice".to_string());
    vars.insert("DL_DELAY".to_string(), "0".to_string());
    vars.insert("MSG_DELAY".to_string(), "0".to_string());
    for (k, v) in pairs {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}
