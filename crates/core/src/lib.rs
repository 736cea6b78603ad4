pub mod backend;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod optimization;
pub mod render;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        /// Deadline applied to every single backend request.
        pub http_timeout: Duration,
        pub poll_interval: Duration,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let api_base_url = lookup("FOLIO_API_BASE_URL")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

            let http_timeout_secs = match lookup("FOLIO_HTTP_TIMEOUT_SECS") {
                Some(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("FOLIO_HTTP_TIMEOUT_SECS is not a number: {s}"))?,
                None => DEFAULT_HTTP_TIMEOUT_SECS,
            };
            anyhow::ensure!(http_timeout_secs > 0, "FOLIO_HTTP_TIMEOUT_SECS must be > 0");

            let poll_interval_ms = match lookup("FOLIO_POLL_INTERVAL_MS") {
                Some(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("FOLIO_POLL_INTERVAL_MS is not a number: {s}"))?,
                None => DEFAULT_POLL_INTERVAL_MS,
            };
            anyhow::ensure!(poll_interval_ms > 0, "FOLIO_POLL_INTERVAL_MS must be > 0");

            Ok(Self {
                api_base_url,
                http_timeout: Duration::from_secs(http_timeout_secs),
                poll_interval: Duration::from_millis(poll_interval_ms),
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
            })
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.api_base_url = base_url.into();
            self
        }
    }

}
