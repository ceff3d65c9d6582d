use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::util::ServiceExt;

use crate::{
    config::{Config, EmptyPolicy, RenameStyle},
    fetch::Fetcher,
    http::{AppState, build_router},
};

fn test_config() -> Config {
    Config {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        sub_urls: "https://provider.example/sub".to_string(),
        backend_urls: "https://backend.example/sub".to_string(),
        direct: false,
        user_agent: "Clash.Meta/1.18.0".to_string(),
        fetch_timeout_secs: 5,
        exclude_keywords: String::new(),
        rename_style: RenameStyle::Underscore,
        on_empty: EmptyPolicy::Error,
        access_token: String::new(),
        filename: "subfuse".to_string(),
    }
}

fn app(config: Config) -> axum::Router {
    let fetcher = Fetcher::new(&config.user_agent, Duration::from_secs(1)).unwrap();
    build_router(AppState {
        config: Arc::new(config),
        fetcher,
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app(test_config())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_rejected_as_plain_text() {
    let mut config = test_config();
    config.access_token = "secret".to_string();

    let response = app(config)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert!(body_string(response).await.contains("access token"));
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let mut config = test_config();
    config.access_token = "secret".to_string();

    let response = app(config)
        .oneshot(Request::get("/?token=nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_subscription_urls_is_a_config_error() {
    let mut config = test_config();
    config.sub_urls = String::new();

    let response = app(config)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("SUBFUSE_SUB_URLS"));
}

#[tokio::test]
async fn token_check_runs_before_config_validation() {
    let mut config = test_config();
    config.access_token = "secret".to_string();
    config.sub_urls = String::new();

    let response = app(config)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_paths_serve_the_subscription_handler() {
    // The fallback route applies the same token gate as `/`.
    let mut config = test_config();
    config.access_token = "secret".to_string();

    let response = app(config)
        .oneshot(Request::get("/anything").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
