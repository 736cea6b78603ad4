pub mod http;

use crate::domain::optimization::{JobHandle, JobStatus, OptimizationRequest, OptimizationResult};
use crate::domain::portfolio::{HealthReport, NewPortfolio, PerformancePoint, Portfolio};
use crate::error::Result;

pub use http::HttpBackend;

/// The portfolio service as seen by the dashboard. Every call is a single
/// request; retries and polling live above this trait.
#[async_trait::async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn health(&self) -> Result<HealthReport>;

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>>;

    async fn portfolio_performance(
        &self,
        portfolio_id: i64,
        limit: u32,
    ) -> Result<Vec<PerformancePoint>>;

    async fn create_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio>;

    async fn submit_optimization(&self, request: &OptimizationRequest) -> Result<JobHandle>;

    async fn optimization_status(&self, job: &JobHandle) -> Result<JobStatus>;

    async fn latest_optimization(&self, strategy_id: i64) -> Result<OptimizationResult>;
}
