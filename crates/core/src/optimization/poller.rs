use crate::backend::DashboardBackend;
use crate::config::Settings;
use crate::domain::optimization::{JobHandle, JobState, OptimizationResult};
use crate::optimization::fetcher;
use crate::view::DashboardView;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown to the user on any polling failure; the cause goes to the log.
pub const POLL_ERROR_MESSAGE: &str = "Error checking optimization status";
const JOB_FAILED_FALLBACK: &str = "optimization failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait between the resolution of one status query and the next one.
    pub interval: Duration,
    pub query_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.poll_interval,
            query_timeout: settings.http_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollTerminal {
    Completed { strategy_id: i64 },
    Failed { message: String },
    PollError { message: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub terminal: PollTerminal,
    /// Status queries issued, including the one that ended the loop.
    pub polls: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub poll: PollOutcome,
    /// Present only when the job completed and the result fetch succeeded.
    pub result: Option<OptimizationResult>,
}

/// Polling state of one submitted job. Consumed by [`JobSession::run`], so a
/// session reaches its terminal state at most once.
#[derive(Debug)]
pub struct JobSession {
    job: JobHandle,
    strategy_id: i64,
    config: PollConfig,
    cancel: CancellationToken,
}

impl JobSession {
    pub fn new(job: JobHandle, strategy_id: i64, config: PollConfig) -> Self {
        Self {
            job,
            strategy_id,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    pub fn strategy_id(&self) -> i64 {
        self.strategy_id
    }

    /// Token that stops this session's loop when cancelled.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Polls to a terminal state, then fetches and renders the result if the
    /// job completed. The token is honoured during the fetch as well.
    pub async fn run<B, V>(self, backend: &B, view: &V) -> JobOutcome
    where
        B: DashboardBackend + ?Sized,
        V: DashboardView + ?Sized,
    {
        let job = self.job.clone();
        let cancel = self.cancel.clone();
        let poll = self.poll_until_terminal(backend, view).await;
        let result = match &poll.terminal {
            PollTerminal::Completed { strategy_id } => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(task_id = %job, strategy_id, "result fetch cancelled");
                    view.job_cancelled(&job);
                    None
                }
                result = fetcher::fetch_and_render(backend, view, *strategy_id) => result,
            },
            _ => None,
        };
        JobOutcome { poll, result }
    }

    pub async fn poll_until_terminal<B, V>(self, backend: &B, view: &V) -> PollOutcome
    where
        B: DashboardBackend + ?Sized,
        V: DashboardView + ?Sized,
    {
        let job = &self.job;
        let mut polls: u32 = 0;

        view.job_progress(job, 0.0);

        let terminal = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollTerminal::Cancelled,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            polls += 1;
            let query =
                tokio::time::timeout(self.config.query_timeout, backend.optimization_status(job));
            let reply = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollTerminal::Cancelled,
                reply = query => reply,
            };

            let status = match reply {
                Ok(Ok(status)) => status,
                Ok(Err(err)) => {
                    tracing::warn!(
                        task_id = %job,
                        polls,
                        error = %err,
                        "status query failed; polling stopped"
                    );
                    break PollTerminal::PollError {
                        message: POLL_ERROR_MESSAGE.to_string(),
                    };
                }
                Err(_) => {
                    tracing::warn!(
                        task_id = %job,
                        polls,
                        timeout = ?self.config.query_timeout,
                        "status query timed out; polling stopped"
                    );
                    break PollTerminal::PollError {
                        message: POLL_ERROR_MESSAGE.to_string(),
                    };
                }
            };

            match status.state {
                JobState::Running => {
                    let progress = status.progress().unwrap_or(0.0);
                    tracing::debug!(task_id = %job, polls, progress, "optimization running");
                    view.job_progress(job, progress);
                }
                JobState::Completed => {
                    break PollTerminal::Completed {
                        strategy_id: status.strategy_id.unwrap_or(self.strategy_id),
                    };
                }
                JobState::Failed => {
                    break PollTerminal::Failed {
                        message: status
                            .error_message()
                            .unwrap_or(JOB_FAILED_FALLBACK)
                            .to_string(),
                    };
                }
            }
        };

        match &terminal {
            PollTerminal::Completed { strategy_id } => {
                tracing::info!(task_id = %job, polls, strategy_id, "optimization completed");
            }
            PollTerminal::Failed { message } => {
                tracing::warn!(task_id = %job, polls, error = %message, "optimization failed");
                view.job_failed(job, message);
            }
            PollTerminal::PollError { message } => view.poll_error(job, message),
            PollTerminal::Cancelled => {
                tracing::info!(task_id = %job, polls, "optimization polling cancelled");
                view.job_cancelled(job);
            }
        }

        PollOutcome { terminal, polls }
    }
}
