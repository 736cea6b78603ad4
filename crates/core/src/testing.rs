//! Scripted backend and recording view shared by the flow tests.

use crate::backend::DashboardBackend;
use crate::domain::optimization::{
    JobHandle, JobStatus, OptimizationRequest, OptimizationResult, PerformanceMetrics,
};
use crate::domain::portfolio::{HealthReport, NewPortfolio, PerformancePoint, Portfolio};
use crate::error::{DashboardError, Result};
use crate::view::DashboardView;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply to a status query.
pub enum StatusReply {
    Status(JobStatus),
    Error(DashboardError),
    /// Never resolves.
    Hang,
}

#[derive(Default)]
pub struct ScriptedBackend {
    pub submit_reply: Mutex<Option<Result<JobHandle>>>,
    pub status_script: Mutex<VecDeque<StatusReply>>,
    pub latest_reply: Mutex<Option<Result<OptimizationResult>>>,
    pub calls: Mutex<Vec<String>>,
    /// Submission waits on this when set.
    pub submit_gate: Option<tokio::sync::Notify>,
    /// Result fetch waits on this when set.
    pub latest_gate: Option<tokio::sync::Notify>,
    /// Delay before each status reply.
    pub status_latency: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn with_statuses(statuses: impl IntoIterator<Item = StatusReply>) -> Self {
        Self {
            submit_reply: Mutex::new(Some(Ok(JobHandle::new("abc")))),
            status_script: Mutex::new(statuses.into_iter().collect()),
            latest_reply: Mutex::new(Some(Ok(sample_result(1)))),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Most status queries ever outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn status(json: serde_json::Value) -> StatusReply {
    StatusReply::Status(serde_json::from_value(json).unwrap())
}

pub fn sample_result(strategy_id: i64) -> OptimizationResult {
    OptimizationResult {
        id: Some(1),
        strategy_id,
        metrics: PerformanceMetrics {
            sharpe_ratio: 1.5,
            total_return: 0.12,
            max_drawdown: 0.05,
            win_rate: 0.6,
        },
        parameters: Default::default(),
        timestamp: None,
    }
}

#[async_trait::async_trait]
impl DashboardBackend for ScriptedBackend {
    async fn health(&self) -> Result<HealthReport> {
        self.record("health".to_string());
        Ok(HealthReport {
            status: "ok".to_string(),
            version: None,
            timestamp: None,
        })
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.record("list_portfolios".to_string());
        Ok(Vec::new())
    }

    async fn portfolio_performance(
        &self,
        portfolio_id: i64,
        limit: u32,
    ) -> Result<Vec<PerformancePoint>> {
        self.record(format!("performance:{portfolio_id}:{limit}"));
        Ok(Vec::new())
    }

    async fn create_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio> {
        self.record(format!("create_portfolio:{}", portfolio.name));
        Ok(Portfolio {
            id: 1,
            name: portfolio.name.clone(),
            description: portfolio.description.clone(),
            current_value: Some(portfolio.initial_capital),
            is_active: true,
            risk_tolerance: portfolio.risk_tolerance,
        })
    }

    async fn submit_optimization(&self, request: &OptimizationRequest) -> Result<JobHandle> {
        self.record(format!("submit:{}", request.strategy_id));
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        self.submit_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(DashboardError::transport("no scripted submit reply")))
    }

    async fn optimization_status(&self, job: &JobHandle) -> Result<JobStatus> {
        self.record(format!("status:{job}"));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.status_latency.is_zero() {
            tokio::time::sleep(self.status_latency).await;
        }

        let next = self.status_script.lock().unwrap().pop_front();
        let reply = match next {
            Some(StatusReply::Status(s)) => Ok(s),
            Some(StatusReply::Error(e)) => Err(e),
            Some(StatusReply::Hang) => std::future::pending().await,
            None => panic!("status polled past the end of the script"),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }

    async fn latest_optimization(&self, strategy_id: i64) -> Result<OptimizationResult> {
        self.record(format!("latest:{strategy_id}"));
        if let Some(gate) = &self.latest_gate {
            gate.notified().await;
        }
        self.latest_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(DashboardError::transport("no scripted result")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Submitted(String),
    Progress(f64),
    Failed(String),
    PollError(String),
    Cancelled,
    Rendered(i64),
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, e: ViewEvent) {
        self.events.lock().unwrap().push(e);
    }
}

impl DashboardView for RecordingView {
    fn job_submitted(&self, job: &JobHandle) {
        self.push(ViewEvent::Submitted(job.task_id.clone()));
    }

    fn job_progress(&self, _job: &JobHandle, progress: f64) {
        self.push(ViewEvent::Progress(progress));
    }

    fn job_failed(&self, _job: &JobHandle, message: &str) {
        self.push(ViewEvent::Failed(message.to_string()));
    }

    fn poll_error(&self, _job: &JobHandle, message: &str) {
        self.push(ViewEvent::PollError(message.to_string()));
    }

    fn job_cancelled(&self, _job: &JobHandle) {
        self.push(ViewEvent::Cancelled);
    }

    fn render_optimization_result(&self, result: &OptimizationResult) {
        self.push(ViewEvent::Rendered(result.strategy_id));
    }
}
