use crate::backend::DashboardBackend;
use crate::config::Settings;
use crate::domain::optimization::{JobHandle, JobStatus, OptimizationRequest, OptimizationResult};
use crate::domain::portfolio::{HealthReport, NewPortfolio, PerformancePoint, Portfolio};
use crate::error::{DashboardError, Result};
use anyhow::Context;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const API_PREFIX: [&str; 2] = ["api", "v1"];
const MAX_DETAIL_LEN: usize = 300;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(&settings.api_base_url, settings.http_timeout)
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid backend base URL: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "backend base URL cannot carry a path: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::transport(format!("unusable base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");
        let res = self.http.get(url).query(query).send().await?;
        read_json(res).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        tracing::debug!(%url, "POST");
        let res = self.http.post(url).json(body).send().await?;
        read_json(res).await
    }
}

async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|e| DashboardError::transport(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(DashboardError::Submission {
            status: status.as_u16(),
            detail: error_detail(status, &text),
        });
    }

    serde_json::from_str::<T>(&text).map_err(|e| {
        DashboardError::transport(format!(
            "unexpected response shape ({e}): {}",
            truncate(&text, MAX_DETAIL_LEN)
        ))
    })
}

/// Pulls the backend's `detail` out of an error body, falling back to the
/// raw text and finally to the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        match v.get("detail") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return s.trim().to_string()
            }
            Some(serde_json::Value::Null) | None => {}
            Some(other) => return truncate(&other.to_string(), MAX_DETAIL_LEN),
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return truncate(body, MAX_DETAIL_LEN);
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[async_trait::async_trait]
impl DashboardBackend for HttpBackend {
    async fn health(&self) -> Result<HealthReport> {
        self.get_json(&["health"], &[]).await
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.get_json(&["portfolios"], &[]).await
    }

    async fn portfolio_performance(
        &self,
        portfolio_id: i64,
        limit: u32,
    ) -> Result<Vec<PerformancePoint>> {
        let id = portfolio_id.to_string();
        self.get_json(
            &["portfolios", &id, "performance"],
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn create_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio> {
        self.post_json(&["portfolios"], portfolio).await
    }

    async fn submit_optimization(&self, request: &OptimizationRequest) -> Result<JobHandle> {
        self.post_json(&["optimization", "optimize"], request).await
    }

    async fn optimization_status(&self, job: &JobHandle) -> Result<JobStatus> {
        self.get_json(&["optimization", "status", &job.task_id], &[])
            .await
    }

    async fn latest_optimization(&self, strategy_id: i64) -> Result<OptimizationResult> {
        let id = strategy_id.to_string();
        self.get_json(&["optimization", "latest", &id], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimization::JobState;
    use crate::optimization::poller::POLL_ERROR_MESSAGE;
    use crate::optimization::{JobSession, PollConfig, PollTerminal};
    use crate::testing::RecordingView;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn builds_prefixed_urls_and_escapes_ids() {
        let b = backend("http://localhost:8000/");
        let url = b.url(&["optimization", "status", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/optimization/status/a%20b%2Fc"
        );

        let b = backend("https://folio.example.com/proxy");
        let url = b.url(&["health"]).unwrap();
        assert_eq!(url.as_str(), "https://folio.example.com/proxy/api/v1/health");
    }

    #[test]
    fn error_detail_prefers_backend_message() {
        assert_eq!(
            error_detail(StatusCode::NOT_FOUND, r#"{"detail":"Strategy not found"}"#),
            "Strategy not found"
        );
        assert_eq!(
            error_detail(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"detail":[{"loc":["body","days"],"msg":"bad"}]}"#
            ),
            r#"[{"loc":["body","days"],"msg":"bad"}]"#
        );
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_detail(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }

    #[tokio::test]
    async fn submit_and_poll_round_trip_against_live_router() {
        let app = Router::new()
            .route(
                "/api/v1/optimization/optimize",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["asset_ids"], json!([7, 9]));
                    assert_eq!(body["objective"], json!("sharpe_ratio"));
                    Json(json!({"task_id": 77}))
                }),
            )
            .route(
                "/api/v1/optimization/status/:task_id",
                get(|Path(task_id): Path<String>| async move {
                    assert_eq!(task_id, "77");
                    Json(json!({"strategy_id": 1, "status": "running", "progress": 0.25}))
                }),
            );
        let b = backend(&serve(app).await);

        let req = OptimizationRequest::new(1, [7, 9]);
        let job = b.submit_optimization(&req).await.unwrap();
        assert_eq!(job.task_id, "77");

        let status = b.optimization_status(&job).await.unwrap();
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.progress(), Some(0.25));
    }

    #[tokio::test]
    async fn non_success_becomes_submission_error_with_detail() {
        let app = Router::new().route(
            "/api/v1/optimization/optimize",
            post(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"detail": "Asset with ID 9 not found"})),
                )
            }),
        );
        let b = backend(&serve(app).await);

        let err = b
            .submit_optimization(&OptimizationRequest::new(1, [9]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DashboardError::Submission {
                status: 404,
                detail: "Asset with ID 9 not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_transport_error() {
        let app = Router::new().route(
            "/api/v1/optimization/status/:task_id",
            get(|| async { "<html>gateway</html>" }),
        );
        let b = backend(&serve(app).await);

        let err = b
            .optimization_status(&JobHandle::new("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Transport(_)));
    }

    #[tokio::test]
    async fn unknown_job_state_stops_polling() {
        let app = Router::new().route(
            "/api/v1/optimization/status/:task_id",
            get(|| async { Json(json!({"status": "archived", "progress": 1.0})) }),
        );
        let b = backend(&serve(app).await);
        let config = PollConfig {
            interval: Duration::from_millis(10),
            query_timeout: Duration::from_secs(5),
        };
        let view = RecordingView::default();

        let outcome = JobSession::new(JobHandle::new("abc"), 1, config)
            .run(&b, &view)
            .await;

        assert_eq!(outcome.poll.polls, 1);
        assert_eq!(
            outcome.poll.terminal,
            PollTerminal::PollError {
                message: POLL_ERROR_MESSAGE.to_string()
            }
        );
        assert!(outcome.result.is_none());
    }

    #[tokio::test]
    async fn performance_passes_limit_and_parses_naive_timestamps() {
        let app = Router::new().route(
            "/api/v1/portfolios/:id/performance",
            get(
                |Path(id): Path<i64>, Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(id, 4);
                    assert_eq!(q.get("limit").map(String::as_str), Some("10"));
                    Json(json!([
                        {
                            "id": 1,
                            "portfolio_id": 4,
                            "timestamp": "2026-03-01T00:00:00",
                            "total_return": 0.01,
                            "daily_return": 0.01,
                            "sharpe_ratio": 1.1,
                            "max_drawdown": 0.02,
                        }
                    ]))
                },
            ),
        );
        let b = backend(&serve(app).await);

        let points = b.portfolio_performance(4, 10).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].sharpe_ratio, 1.1);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let b = backend(&format!("http://{addr}"));
        let err = b.health().await.unwrap_err();
        assert!(matches!(err, DashboardError::Transport(_)));
    }
}
