use crate::backend::DashboardBackend;
use crate::domain::optimization::{JobHandle, OptimizationRequest};
use crate::error::{DashboardError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Submits optimization requests. Holds the enabled/disabled state of the
/// submit control: it is disabled for exactly as long as a request is in
/// flight.
#[derive(Debug, Default)]
pub struct JobSubmitter {
    in_flight: AtomicBool,
}

impl JobSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit<B>(&self, backend: &B, request: &OptimizationRequest) -> Result<JobHandle>
    where
        B: DashboardBackend + ?Sized,
    {
        request.validate()?;

        let _guard = InFlightGuard::acquire(&self.in_flight)
            .ok_or(DashboardError::SubmissionInFlight)?;

        tracing::info!(
            strategy_id = request.strategy_id,
            assets = request.asset_ids.len(),
            objective = %request.objective,
            days = request.days,
            "submitting optimization"
        );

        let job = backend.submit_optimization(request).await?;
        if job.task_id.trim().is_empty() {
            return Err(DashboardError::transport("backend returned an empty task_id"));
        }

        tracing::info!(task_id = %job, strategy_id = request.strategy_id, "optimization accepted");
        Ok(job)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
