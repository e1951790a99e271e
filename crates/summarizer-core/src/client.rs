use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Body posted to the summarize endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub text: String,
    pub length: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// A response the server produced on purpose: either a summary (2xx) or an
/// error string (anything else).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    Summary(String),
    Error(String),
}

/// Anything that kept us from getting a well-formed reply.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no summarize URL configured")]
    MissingEndpoint,
}

#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(
        &self,
        url: &str,
        request: &SummaryRequest,
    ) -> Result<ServerReply, SummarizeError>;
}

#[derive(Debug, Clone)]
pub struct HttpSummaryClient {
    client: Client,
}

impl HttpSummaryClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Client with an overall request timeout. `None` keeps reqwest's defaults.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, SummarizeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for HttpSummaryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryBackend for HttpSummaryClient {
    async fn summarize(
        &self,
        url: &str,
        request: &SummaryRequest,
    ) -> Result<ServerReply, SummarizeError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "summarize response received");

        if status.is_success() {
            let parsed: SummaryResponse = serde_json::from_slice(&body)?;
            Ok(ServerReply::Summary(parsed.summary))
        } else {
            let parsed: ErrorResponse = serde_json::from_slice(&body)?;
            Ok(ServerReply::Error(parsed.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(Option<String>, SummaryRequest)>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{}/summarize", addr)
    }

    fn recording_router(seen: Seen) -> Router {
        Router::new().route(
            "/summarize",
            post(move |headers: HeaderMap, Json(body): Json<SummaryRequest>| {
                let seen = seen.clone();
                async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let reply = format!("{} words", body.text.split_whitespace().count());
                    seen.lock().unwrap().push((content_type, body));
                    Json(json!({ "summary": reply }))
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_posts_json_body_and_reads_summary() {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let url = serve(recording_router(seen.clone())).await;

        let request = SummaryRequest {
            text: "one two three".to_string(),
            length: "short".to_string(),
        };
        let reply = HttpSummaryClient::new()
            .summarize(&url, &request)
            .await
            .expect("reply");

        assert_eq!(reply, ServerReply::Summary("3 words".to_string()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("application/json"));
        assert_eq!(seen[0].1, request);
    }

    #[tokio::test]
    async fn test_non_success_status_reads_error_field() {
        let router = Router::new().route(
            "/summarize",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Text is required" })),
                )
                    .into_response()
            }),
        );
        let url = serve(router).await;

        let request = SummaryRequest {
            text: "x".to_string(),
            length: "medium".to_string(),
        };
        let reply = HttpSummaryClient::new()
            .summarize(&url, &request)
            .await
            .expect("reply");

        assert_eq!(reply, ServerReply::Error("Text is required".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route(
            "/summarize",
            post(|| async { (StatusCode::OK, "<html>not json</html>").into_response() }),
        );
        let url = serve(router).await;

        let request = SummaryRequest {
            text: "x".to_string(),
            length: "long".to_string(),
        };
        let err = HttpSummaryClient::new()
            .summarize(&url, &request)
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status_without_error_field_is_decode_error() {
        let router = Router::new().route(
            "/summarize",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response() }),
        );
        let url = serve(router).await;

        let request = SummaryRequest {
            text: "x".to_string(),
            length: "long".to_string(),
        };
        let err = HttpSummaryClient::new()
            .summarize(&url, &request)
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = SummaryRequest {
            text: "x".to_string(),
            length: "short".to_string(),
        };
        let err = HttpSummaryClient::new()
            .summarize(&format!("http://{}/summarize", addr), &request)
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Transport(_)));
    }
}
