//! HTTP client for the notification sink.
//!
//! The sink receives two kinds of JSON notifications:
//!
//! - `POST {base_url}/receive_timestamp` with `{"timestamp": "HH:MM:SS.mmm"}`
//! - `POST {base_url}/receive_matrix` with
//!   `{"originalMatrix": [[..]..], "transformedMatrix": [[..]..]}`
//!
//! A notification counts as delivered only when the sink answers with a
//! 2xx status. Nothing is retried.

use std::fmt;

use serde::Serialize;

use crate::config::SinkConfig;
use crate::error::Result;
use crate::matrix::Matrix;

/// Path receiving producer timestamps.
pub const TIMESTAMP_PATH: &str = "/receive_timestamp";

/// Path receiving relay matrix pairs.
pub const MATRIX_PATH: &str = "/receive_matrix";

/// Body of a timestamp notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampNotification {
    pub timestamp: String,
}

/// Body of a matrix notification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixNotification<'a> {
    pub original_matrix: &'a Matrix,
    pub transformed_matrix: &'a Matrix,
}

/// Result of a publish attempt, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The sink accepted the notification.
    Delivered { status: u16 },
    /// Transport failure or non-success response.
    Failed { reason: String },
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. })
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Delivered { status } => write!(f, "delivered ({})", status),
            PublishOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Client posting notifications to the sink.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SinkClient {
    client: reqwest::Client,
    base_url: String,
}

impl SinkClient {
    /// Create a client for the configured sink.
    pub fn new(config: &SinkConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a sink path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Post a JSON body and return the response status.
    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<u16> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        tracing::trace!(url = %url, status, "Sink accepted notification");
        Ok(status)
    }

    /// Send a producer timestamp.
    pub async fn send_timestamp(&self, timestamp: &str) -> Result<()> {
        let body = TimestampNotification {
            timestamp: timestamp.to_string(),
        };
        self.post_json(TIMESTAMP_PATH, &body).await?;
        Ok(())
    }

    /// Publish an original matrix with its downsampled counterpart.
    pub async fn publish_matrices(&self, original: &Matrix, transformed: &Matrix) -> PublishOutcome {
        let body = MatrixNotification {
            original_matrix: original,
            transformed_matrix: transformed,
        };

        match self.post_json(MATRIX_PATH, &body).await {
            Ok(status) => PublishOutcome::Delivered { status },
            Err(e) => PublishOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};
    use axum::routing::post;
    use serde_json::Value;

    type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_sink(status: StatusCode) -> (SocketAddr, Recorded) {
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let state = recorded.clone();

        let router = Router::new()
            .route(
                "/*path",
                post(
                    move |State(seen): State<Recorded>, uri: Uri, axum::Json(body): axum::Json<Value>| async move {
                        seen.lock().unwrap().push((uri.path().to_string(), body));
                        status
                    },
                ),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (addr, recorded)
    }

    fn client_for(addr: SocketAddr) -> SinkClient {
        SinkClient::new(&SinkConfig {
            base_url: format!("http://{}/", addr),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = SinkClient::new(&SinkConfig {
            base_url: "http://127.0.0.1:8765/".to_string(),
        })
        .unwrap();

        assert_eq!(
            client.endpoint(TIMESTAMP_PATH),
            "http://127.0.0.1:8765/receive_timestamp"
        );
    }

    #[test]
    fn test_matrix_notification_keys() {
        let original = Matrix::zeros(4);
        let transformed = Matrix::zeros(1);
        let body = MatrixNotification {
            original_matrix: &original,
            transformed_matrix: &transformed,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["originalMatrix"].as_array().unwrap().len(), 4);
        assert_eq!(json["transformedMatrix"], serde_json::json!([[0]]));
    }

    #[tokio::test]
    async fn test_send_timestamp() {
        let (addr, recorded) = spawn_sink(StatusCode::OK).await;
        let client = client_for(addr);

        client.send_timestamp("12:34:56.789").await.unwrap();

        let seen = recorded.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, TIMESTAMP_PATH);
        assert_eq!(seen[0].1, serde_json::json!({ "timestamp": "12:34:56.789" }));
    }

    #[tokio::test]
    async fn test_publish_delivered() {
        let (addr, recorded) = spawn_sink(StatusCode::OK).await;
        let client = client_for(addr);

        let outcome = client
            .publish_matrices(&Matrix::filled(4, 7), &Matrix::zeros(1))
            .await;

        assert_eq!(outcome, PublishOutcome::Delivered { status: 200 });
        let seen = recorded.lock().unwrap();
        assert_eq!(seen[0].0, MATRIX_PATH);
        assert_eq!(seen[0].1["originalMatrix"][3][3], 7);
    }

    #[tokio::test]
    async fn test_publish_rejected_status_is_failure() {
        let (addr, _recorded) = spawn_sink(StatusCode::BAD_REQUEST).await;
        let client = client_for(addr);

        let outcome = client
            .publish_matrices(&Matrix::zeros(4), &Matrix::zeros(1))
            .await;

        assert!(!outcome.is_delivered());
        assert!(outcome.to_string().starts_with("failed"));
    }

    #[tokio::test]
    async fn test_send_timestamp_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        assert!(client.send_timestamp("00:00:00.000").await.is_err());
    }
}
