use crate::domain::optimization::{JobHandle, OptimizationResult};

/// Where the optimization flow reports to. The CLI prints to the terminal;
/// tests record calls.
pub trait DashboardView: Send + Sync {
    fn job_submitted(&self, _job: &JobHandle) {}

    /// Only called while the job is running.
    fn job_progress(&self, job: &JobHandle, progress: f64);

    fn job_failed(&self, job: &JobHandle, message: &str);

    /// Generic polling failure; the underlying cause is only logged.
    fn poll_error(&self, job: &JobHandle, message: &str);

    fn job_cancelled(&self, _job: &JobHandle) {}

    fn render_optimization_result(&self, result: &OptimizationResult);
}
