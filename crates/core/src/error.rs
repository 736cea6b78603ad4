/// Failures of a single dashboard operation. None of them is fatal to the
/// process; each one is scoped to the request that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// Client-side input check failed; no request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The submit control is disabled while a submission is in flight.
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// Non-2xx response; `detail` is the backend's own message.
    #[error("backend returned HTTP {status}: {detail}")]
    Submission { status: u16, detail: String },

    /// Network, deadline or decode failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend reported the optimization job as failed.
    #[error("optimization failed: {0}")]
    JobFailure(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Transport(format!("failed to decode response: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
