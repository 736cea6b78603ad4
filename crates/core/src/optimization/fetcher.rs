use crate::backend::DashboardBackend;
use crate::domain::optimization::OptimizationResult;
use crate::view::DashboardView;

/// Fetches the latest finished optimization for a strategy and hands it to
/// the view. A failed fetch is logged and dropped; the user already saw the
/// job complete.
pub async fn fetch_and_render<B, V>(
    backend: &B,
    view: &V,
    strategy_id: i64,
) -> Option<OptimizationResult>
where
    B: DashboardBackend + ?Sized,
    V: DashboardView + ?Sized,
{
    match backend.latest_optimization(strategy_id).await {
        Ok(result) => {
            tracing::info!(
                strategy_id,
                sharpe_ratio = result.metrics.sharpe_ratio,
                total_return = result.metrics.total_return,
                "fetched latest optimization result"
            );
            view.render_optimization_result(&result);
            Some(result)
        }
        Err(err) => {
            tracing::warn!(strategy_id, error = %err, "failed to fetch latest optimization result");
            None
        }
    }
}
