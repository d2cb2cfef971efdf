//! 뉴스 검색 클라이언트 (Tavily).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// 기본 검색 결과 수.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// 검색 결과 수 범위.
pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 10;

/// 요청된 결과 수를 1..=10 범위로 제한합니다.
pub fn clamp_max_results(requested: Option<i64>) -> u32 {
    let requested = requested.unwrap_or(DEFAULT_MAX_RESULTS as i64);
    requested.clamp(MIN_RESULTS as i64, MAX_RESULTS as i64) as u32
}

/// 정규화된 뉴스 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<f64>,
    pub snippet: Option<String>,
    pub source: Option<String>,
}

/// 뉴스 검색 에러.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// 뉴스 검색 trait.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<NewsItem>, NewsError>;
}

/// Tavily 설정.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: SecretString,
    /// API 기본 URL (`https://api.tavily.com`)
    pub base_url: String,
    pub timeout_secs: u64,
}

impl TavilyConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: "https://api.tavily.com".to_string(),
            timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    max_results: u32,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: Option<String>,
    score: Option<f64>,
    content: Option<String>,
    snippet: Option<String>,
    source: Option<String>,
}

impl From<SearchResult> for NewsItem {
    fn from(result: SearchResult) -> Self {
        NewsItem {
            snippet: non_empty(result.content).or_else(|| non_empty(result.snippet)),
            source: non_empty(result.source).or_else(|| result.url.clone()),
            title: result.title,
            url: result.url,
            score: result.score,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tavily 검색 클라이언트.
pub struct TavilyClient {
    config: TavilyConfig,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NewsError::InvalidConfig(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn map_request_error(&self, err: reqwest::Error) -> NewsError {
        if err.is_timeout() {
            NewsError::Timeout(self.config.timeout_secs)
        } else {
            NewsError::Network(err)
        }
    }
}

#[async_trait]
impl NewsSearch for TavilyClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<NewsItem>, NewsError> {
        let body = SearchRequest {
            api_key: self.config.api_key.expose_secret(),
            query,
            search_depth: "basic",
            max_results,
            include_answer: false,
        };

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| self.map_request_error(e))?;

        debug!(count = payload.results.len(), "News search completed");
        Ok(payload.results.into_iter().map(NewsItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_clamp_max_results() {
        assert_eq!(clamp_max_results(Some(50)), 10);
        assert_eq!(clamp_max_results(Some(0)), 1);
        assert_eq!(clamp_max_results(Some(-3)), 1);
        assert_eq!(clamp_max_results(Some(7)), 7);
        assert_eq!(clamp_max_results(None), DEFAULT_MAX_RESULTS);
    }

    fn client(server: &mockito::ServerGuard) -> TavilyClient {
        let config = TavilyConfig::new(SecretString::from("tvly-test"))
            .with_base_url(server.url())
            .with_timeout_secs(5);
        TavilyClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_search_normalizes_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_body(Matcher::Json(json!({
                "api_key": "tvly-test",
                "query": "latest finance news about revenue",
                "search_depth": "basic",
                "max_results": 3,
                "include_answer": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "results": [
                        {"title": "A", "url": "https://a.example", "score": 0.9, "content": "body a"},
                        {"title": "B", "url": "https://b.example", "snippet": "snip b", "source": "Wire"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let items = client(&server)
            .search("latest finance news about revenue", 3)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].snippet.as_deref(), Some("body a"));
        assert_eq!(items[0].source.as_deref(), Some("https://a.example"));
        assert_eq!(items[1].snippet.as_deref(), Some("snip b"));
        assert_eq!(items[1].source.as_deref(), Some("Wire"));
        assert!(items[1].score.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let err = client(&server).search("q", 5).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: invalid key");
    }

    #[test]
    fn test_empty_content_falls_back_to_snippet() {
        let item = NewsItem::from(SearchResult {
            title: Some("t".to_string()),
            url: Some("https://news.example/a".to_string()),
            score: None,
            content: Some(String::new()),
            snippet: Some("short summary".to_string()),
            source: Some(String::new()),
        });
        assert_eq!(item.snippet.as_deref(), Some("short summary"));
        assert_eq!(item.source.as_deref(), Some("https://news.example/a"));
    }

    #[tokio::test]
    async fn test_slow_search_is_timeout() {
        use std::io::Write;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_secs(3));
                w.write_all(br#"{"results": []}"#)
            })
            .create_async()
            .await;

        let config = TavilyConfig::new(SecretString::from("tvly-test"))
            .with_base_url(server.url())
            .with_timeout_secs(1);
        let err = TavilyClient::new(config)
            .unwrap()
            .search("q", 5)
            .await
            .unwrap_err();

        assert!(matches!(err, NewsError::Timeout(1)), "got {:?}", err);
    }
}
