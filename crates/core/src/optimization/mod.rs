//! Submit → poll → fetch flow for backend optimization jobs.

pub mod fetcher;
pub mod poller;
pub mod submitter;

pub use poller::{JobOutcome, JobSession, PollConfig, PollOutcome, PollTerminal};
pub use submitter::JobSubmitter;

use crate::backend::DashboardBackend;
use crate::domain::optimization::OptimizationRequest;
use crate::error::Result;
use crate::view::DashboardView;

#[derive(Debug, Default)]
pub struct OptimizationFlow {
    submitter: JobSubmitter,
    config: PollConfig,
}

impl OptimizationFlow {
    pub fn new(config: PollConfig) -> Self {
        Self {
            submitter: JobSubmitter::new(),
            config,
        }
    }

    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    /// Submits the request and returns a session in the `Running` state.
    /// Callers grab [`JobSession::cancel_handle`] before running it.
    pub async fn start<B, V>(
        &self,
        backend: &B,
        view: &V,
        request: &OptimizationRequest,
    ) -> Result<JobSession>
    where
        B: DashboardBackend + ?Sized,
        V: DashboardView + ?Sized,
    {
        let job = self.submitter.submit(backend, request).await?;
        view.job_submitted(&job);
        Ok(JobSession::new(job, request.strategy_id, self.config))
    }
}
