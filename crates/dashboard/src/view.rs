use folio_core::domain::optimization::{JobHandle, OptimizationResult};
use folio_core::render;
use folio_core::view::DashboardView;
use std::io::Write;

const PROGRESS_WIDTH: usize = 30;

/// Terminal stand-in for the dashboard page: status lines on stderr,
/// results on stdout.
#[derive(Debug, Default)]
pub struct TerminalView;

impl DashboardView for TerminalView {
    fn job_submitted(&self, job: &JobHandle) {
        eprintln!("Optimization started (task {job})");
    }

    fn job_progress(&self, _job: &JobHandle, progress: f64) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", render::progress_bar(progress, PROGRESS_WIDTH));
        let _ = err.flush();
    }

    fn job_failed(&self, _job: &JobHandle, message: &str) {
        eprintln!("\nOptimization failed: {message}");
    }

    fn poll_error(&self, _job: &JobHandle, message: &str) {
        eprintln!("\n{message}");
    }

    fn job_cancelled(&self, job: &JobHandle) {
        eprintln!("\nStopped watching task {job}; it may still be running on the server");
    }

    fn render_optimization_result(&self, result: &OptimizationResult) {
        eprintln!();
        print!("{}", render::optimization_summary(result));
    }
}
