use std::time::Duration;

use futures_util::future::join_all;
use tracing::debug;

use crate::config::Config;
use crate::extract::split_into_node_blocks;
use crate::usage::UsageSummary;

/// Upstream header carrying per-subscription usage accounting.
pub const USERINFO_HEADER: &str = "subscription-userinfo";

/// One successful subscription fetch: the raw body plus the optional
/// usage-accounting header it arrived with.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: String,
    pub userinfo: Option<String>,
}

/// Everything harvested for one inbound request.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub blocks: Vec<String>,
    pub usage: UsageSummary,
}

#[derive(Debug)]
pub enum FetchError {
    Client { reason: String },
    NoNodes,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client { reason } => write!(f, "http client setup failed: {reason}"),
            Self::NoNodes => write!(
                f,
                "no backend yielded any node; check that the subscription URLs are valid"
            ),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Fetches all sources through one conversion backend concurrently,
    /// keeping whatever succeeded. Individual failures are dropped here;
    /// only a fully empty harvest becomes an error, in [`harvest`].
    pub async fn fetch_via_backend(&self, backend: &str, sources: &[String]) -> Vec<FetchResult> {
        let futures = sources
            .iter()
            .map(|source| self.fetch_one(conversion_request(&self.client, backend, source)));
        join_all(futures).await.into_iter().flatten().collect()
    }

    /// Fetches the subscription URLs themselves, without a backend.
    pub async fn fetch_direct(&self, sources: &[String]) -> Vec<FetchResult> {
        let futures = sources
            .iter()
            .map(|source| self.fetch_one(self.client.get(source)));
        join_all(futures).await.into_iter().flatten().collect()
    }

    async fn fetch_one(&self, request: reqwest::RequestBuilder) -> Option<FetchResult> {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "subscription fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "subscription fetch returned non-success");
            return None;
        }
        let userinfo = response
            .headers()
            .get(USERINFO_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                debug!(error = %e, "subscription body read failed");
                return None;
            }
        };
        if !looks_like_node_list(&body) {
            debug!("subscription body has no recognizable node marker");
            return None;
        }
        Some(FetchResult { body, userinfo })
    }
}

/// A body counts only when it carries a node-list marker; anything else is
/// treated the same as a failed fetch.
pub fn looks_like_node_list(body: &str) -> bool {
    body.contains("proxies:") || body.contains("name:")
}

fn conversion_request(
    client: &reqwest::Client,
    backend: &str,
    source: &str,
) -> reqwest::RequestBuilder {
    client.get(backend).query(&[
        ("target", "clash"),
        ("ver", "meta"),
        ("url", source),
        ("list", "true"),
        ("emoji", "true"),
        ("udp", "true"),
        ("scv", "true"),
        ("fdn", "true"),
    ])
}

/// Runs the backend priority loop for one request.
///
/// Backends are tried sequentially; within a backend all sources are fetched
/// concurrently. The loop stops at the first backend that yields at least one
/// node block, so the remaining third-party services are not hit needlessly.
/// Usage headers are folded only for the round that produced the nodes.
pub async fn harvest(fetcher: &Fetcher, config: &Config) -> Result<Harvest, FetchError> {
    let sources = config.subscription_urls();

    let rounds: Vec<Option<String>> = if config.direct {
        vec![None]
    } else {
        config.backends().into_iter().map(Some).collect()
    };

    for round in rounds {
        let results = match &round {
            Some(backend) => fetcher.fetch_via_backend(backend, &sources).await,
            None => fetcher.fetch_direct(&sources).await,
        };

        let mut blocks: Vec<String> = Vec::new();
        let mut usage = UsageSummary::default();
        for result in results {
            usage.fold_header(result.userinfo.as_deref());
            blocks.extend(split_into_node_blocks(&result.body));
        }

        // Accounting comes only from the round that produced the nodes; a
        // round whose bodies yielded no blocks is discarded wholesale.
        if !blocks.is_empty() {
            return Ok(Harvest { blocks, usage });
        }
    }

    Err(FetchError::NoNodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_check_accepts_either_form() {
        assert!(looks_like_node_list("proxies:\n  - {name: a}"));
        assert!(looks_like_node_list("- name: a\n  type: ss"));
        assert!(!looks_like_node_list("<html>rate limited</html>"));
        assert!(!looks_like_node_list(""));
    }
}
