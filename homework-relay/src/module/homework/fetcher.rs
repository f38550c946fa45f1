//! Homework review API client
//!
//! Performs one authenticated GET per poll and validates the shape of the
//! returned document before handing records to the differ.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;

use super::HomeworkSource;
use super::error::FetchError;
use super::types::{HomeworkRecord, StatusReport};

const USER_AGENT: &str = "homework-relay/0.1";

pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch_statuses(&self, from_date: i64) -> Result<StatusReport, FetchError> {
        tracing::debug!("Requesting homework statuses from {} (from_date={})", self.endpoint, from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from_date", from_date)])
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus { status });
        }

        let body = response.text().await.map_err(FetchError::Request)?;
        check_response(&body)
    }
}

/// Validate a raw response body and extract the homework list.
pub fn check_response(body: &str) -> Result<StatusReport, FetchError> {
    let document: Value = serde_json::from_str(body).map_err(FetchError::MalformedJson)?;

    let Value::Object(mut fields) = document else {
        return Err(FetchError::WrongType {
            field: "<root>",
            expected: "object",
        });
    };

    let raw_homeworks = match fields.remove("homeworks") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(FetchError::WrongType {
                field: "homeworks",
                expected: "list",
            });
        }
        None => return Err(FetchError::MissingField("homeworks")),
    };

    let current_date = match fields.get("current_date") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_i64().ok_or(FetchError::WrongType {
            field: "current_date",
            expected: "integer",
        })?),
    };

    let homeworks = raw_homeworks
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<HomeworkRecord>(item)
                .map_err(|source| FetchError::InvalidRecord { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StatusReport {
        homeworks,
        current_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use std::collections::HashMap;

    const TOKEN: &str = "y0_test";

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/user_api/homework_statuses/", addr)
    }

    async fn statuses(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        if auth != Some("OAuth y0_test") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let from_date: i64 = params
            .get("from_date")
            .and_then(|v| v.parse().ok())
            .ok_or(StatusCode::BAD_REQUEST)?;

        Ok(Json(serde_json::json!({
            "homeworks": [{
                "id": 7,
                "status": "approved",
                "homework_name": "hw1",
                "date_updated": "2026-10-19T10:00:00Z"
            }],
            "current_date": from_date + 600
        })))
    }

    fn client(endpoint: String, token: &str) -> PracticumClient {
        PracticumClient::new(endpoint, token, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_window_and_token() {
        let endpoint = serve(Router::new().route("/api/user_api/homework_statuses/", get(statuses))).await;

        let report = client(endpoint, TOKEN).fetch_statuses(1_000).await.unwrap();
        assert_eq!(report.current_date, Some(1_600));
        assert_eq!(report.homeworks.len(), 1);
        assert_eq!(report.homeworks[0].homework_name, "hw1");
    }

    #[tokio::test]
    async fn test_fetch_keeps_existing_query_string() {
        let endpoint = serve(Router::new().route("/api/user_api/homework_statuses/", get(statuses))).await;

        let report = client(format!("{}?lang=en", endpoint), TOKEN)
            .fetch_statuses(1_000)
            .await
            .unwrap();
        assert_eq!(report.current_date, Some(1_600));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_success_status() {
        let endpoint = serve(Router::new().route(
            "/api/user_api/homework_statuses/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let err = client(endpoint, TOKEN).fetch_statuses(0).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::UnexpectedStatus { status } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_fetch_with_wrong_token() {
        let endpoint = serve(Router::new().route("/api/user_api/homework_statuses/", get(statuses))).await;

        let err = client(endpoint, "stale").fetch_statuses(0).await.unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedStatus { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}/", addr), TOKEN).fetch_statuses(0).await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }

    #[test]
    fn test_check_response_empty_list() {
        let report = check_response(r#"{"homeworks": [], "current_date": 1700000000}"#).unwrap();
        assert!(report.homeworks.is_empty());
        assert_eq!(report.current_date, Some(1_700_000_000));
    }

    #[test]
    fn test_check_response_malformed_json() {
        assert!(matches!(
            check_response("<html>maintenance</html>"),
            Err(FetchError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_check_response_missing_homeworks() {
        assert!(matches!(
            check_response(r#"{"current_date": 1700000000}"#),
            Err(FetchError::MissingField("homeworks"))
        ));
    }

    #[test]
    fn test_check_response_wrong_types() {
        assert!(matches!(
            check_response(r#"{"homeworks": {"id": 1}}"#),
            Err(FetchError::WrongType { field: "homeworks", .. })
        ));
        assert!(matches!(
            check_response(r#"[]"#),
            Err(FetchError::WrongType { field: "<root>", .. })
        ));
        assert!(matches!(
            check_response(r#"{"homeworks": [], "current_date": "today"}"#),
            Err(FetchError::WrongType { field: "current_date", .. })
        ));
    }

    #[test]
    fn test_check_response_record_without_status() {
        let err = check_response(r#"{"homeworks": [{"id": 1, "homework_name": "hw1", "date_updated": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRecord { index: 0, .. }));
    }
}
