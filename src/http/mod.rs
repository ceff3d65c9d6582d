use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    config::{Config, EmptyPolicy},
    fetch::{FetchError, Fetcher, harvest},
    groups::classify,
    normalize::{normalize_blocks, placeholder_node},
    template,
};

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
}

/// Errors surfaced to the subscription client. Clash clients show response
/// bodies as-is, so these render as plain text rather than JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<FetchError> for ApiError {
    fn from(value: FetchError) -> Self {
        ApiError::internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(subscription))
        .fallback(get(subscription))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize, Default)]
struct SubscriptionQuery {
    token: Option<String>,
}

async fn subscription(
    State(state): State<AppState>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Response, ApiError> {
    let config = &state.config;

    if !config.access_token.is_empty()
        && query.token.as_deref() != Some(config.access_token.as_str())
    {
        return Err(ApiError::forbidden("invalid or missing access token"));
    }

    if config.subscription_urls().is_empty() {
        return Err(ApiError::internal(
            "no subscription URLs configured; set SUBFUSE_SUB_URLS or --sub-urls",
        ));
    }

    let harvested = harvest(&state.fetcher, config).await?;

    let mut nodes = normalize_blocks(&harvested.blocks, &config.exclusions(), config.rename_style);
    if nodes.is_empty() {
        match config.on_empty {
            EmptyPolicy::Error => {
                return Err(ApiError::internal(
                    "every fetched node was filtered out by the exclusion keywords",
                ));
            }
            EmptyPolicy::Placeholder => {
                warn!("every fetched node was filtered out; emitting placeholder");
                nodes = vec![placeholder_node()];
            }
        }
    }

    let names: Vec<String> = nodes.iter().map(|n| n.name.clone()).collect();
    let buckets = classify(&names);
    let usage = &harvested.usage;
    let body = template::render(&usage.banner(), &nodes, &buckets);

    info!(
        nodes = nodes.len(),
        subscriptions = usage.subscriptions,
        "subscription rendered"
    );

    let disposition = format!("attachment; filename=\"{}.yaml\"", config.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/yaml; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        [("subscription-userinfo", usage.userinfo_header())],
        body,
    )
        .into_response())
}
