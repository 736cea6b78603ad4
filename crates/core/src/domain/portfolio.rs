use crate::error::DashboardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PERFORMANCE_LIMIT: u32 = 30;
pub const MAX_PERFORMANCE_LIMIT: u32 = 365;

const MAX_NAME_LEN: usize = 100;
const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
const DEFAULT_RISK_TOLERANCE: f64 = 0.5;

fn default_true() -> bool {
    true
}

fn default_risk_tolerance() -> f64 {
    DEFAULT_RISK_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_risk_tolerance")]
    pub risk_tolerance: f64,
}

/// Body of the create-portfolio form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPortfolio {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub initial_capital: f64,
    pub risk_tolerance: f64,
}

impl NewPortfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_tolerance: DEFAULT_RISK_TOLERANCE,
        }
    }

    /// Trims text fields and checks the same bounds the backend enforces.
    pub fn validated(self) -> Result<Self, DashboardError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DashboardError::validation("portfolio name must be non-empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DashboardError::validation(format!(
                "portfolio name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(DashboardError::validation(format!(
                "initial capital must be greater than 0 (got {})",
                self.initial_capital
            )));
        }
        if !(0.0..=1.0).contains(&self.risk_tolerance) {
            return Err(DashboardError::validation(format!(
                "risk tolerance must be between 0 and 1 (got {})",
                self.risk_tolerance
            )));
        }

        let description = self
            .description
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            name,
            description,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    #[serde(deserialize_with = "crate::domain::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

pub fn validate_performance_limit(limit: u32) -> Result<(), DashboardError> {
    if !(1..=MAX_PERFORMANCE_LIMIT).contains(&limit) {
        return Err(DashboardError::validation(format!(
            "limit must be 1..={MAX_PERFORMANCE_LIMIT} (got {limit})"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
