//! Read-side dashboard operations and portfolio creation. Input checks run
//! before anything is sent.

use crate::backend::DashboardBackend;
use crate::domain::portfolio::{
    validate_performance_limit, HealthReport, NewPortfolio, PerformancePoint, Portfolio,
};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Overview {
    pub health: Result<HealthReport>,
    pub portfolios: Result<Vec<Portfolio>>,
}

/// Health and portfolio list, fetched together. One failing does not hide
/// the other.
pub async fn load_overview<B>(backend: &B) -> Overview
where
    B: DashboardBackend + ?Sized,
{
    let (health, portfolios) = tokio::join!(backend.health(), backend.list_portfolios());

    if let Err(err) = &health {
        tracing::warn!(error = %err, "health check failed");
    }
    if let Err(err) = &portfolios {
        tracing::warn!(error = %err, "failed to load portfolios");
    }

    Overview { health, portfolios }
}

pub async fn load_performance<B>(
    backend: &B,
    portfolio_id: i64,
    limit: u32,
) -> Result<Vec<PerformancePoint>>
where
    B: DashboardBackend + ?Sized,
{
    validate_performance_limit(limit)?;
    let points = backend.portfolio_performance(portfolio_id, limit).await?;
    tracing::debug!(portfolio_id, limit, points = points.len(), "loaded performance");
    Ok(points)
}

pub async fn create_portfolio<B>(backend: &B, portfolio: NewPortfolio) -> Result<Portfolio>
where
    B: DashboardBackend + ?Sized,
{
    let portfolio = portfolio.validated()?;
    let created = backend.create_portfolio(&portfolio).await?;
    tracing::info!(portfolio_id = created.id, name = %created.name, "portfolio created");
    Ok(created)
}
