use crate::error::DashboardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    #[serde(alias = "sharpe")]
    SharpeRatio,
    TotalReturn,
    MaxDrawdown,
    WinRate,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::SharpeRatio => "sharpe_ratio",
            Objective::TotalReturn => "total_return",
            Objective::MaxDrawdown => "max_drawdown",
            Objective::WinRate => "win_rate",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharpe" | "sharpe_ratio" => Ok(Objective::SharpeRatio),
            "total_return" => Ok(Objective::TotalReturn),
            "max_drawdown" => Ok(Objective::MaxDrawdown),
            "win_rate" => Ok(Objective::WinRate),
            other => Err(DashboardError::validation(format!(
                "unknown objective: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRequest {
    pub strategy_id: i64,
    pub asset_ids: BTreeSet<i64>,
    pub objective: Objective,
    pub days: u32,
}

impl OptimizationRequest {
    pub fn new(strategy_id: i64, asset_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            strategy_id,
            asset_ids: asset_ids.into_iter().collect(),
            objective: Objective::default(),
            days: DEFAULT_HORIZON_DAYS,
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.asset_ids.is_empty() {
            return Err(DashboardError::validation(
                "select at least one asset to optimize against",
            ));
        }
        if self.days == 0 {
            return Err(DashboardError::validation("days must be a positive integer"));
        }
        Ok(())
    }
}

/// Correlation key returned by the submit call. The backend may send the
/// id as a string or a number; it is kept opaque either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    #[serde(deserialize_with = "opaque_id")]
    pub task_id: String,
}

impl JobHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.task_id)
    }
}

fn opaque_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(d)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[serde(alias = "started", alias = "pending")]
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobState::Running)
    }
}

/// One status snapshot. Every poll returns the full state, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "status")]
    pub state: JobState,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub strategy_id: Option<i64>,
}

impl JobStatus {
    /// Progress in `[0, 1]`, only while the job is running.
    pub fn progress(&self) -> Option<f64> {
        if self.state != JobState::Running {
            return None;
        }
        let p = self.progress.unwrap_or(0.0);
        Some(if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) })
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub total_return: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub win_rate: f64,
}

/// Strategy parameter value: a scalar, a list, or a nested object
/// (e.g. indicator weight tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<ParamValue>),
    Nested(BTreeMap<String, ParamValue>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("null"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ParamValue::Nested(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    #[serde(default)]
    pub id: Option<i64>,
    pub strategy_id: i64,
    pub metrics: PerformanceMetrics,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default, deserialize_with = "crate::domain::timestamp::deserialize_opt")]
    pub timestamp: Option<DateTime<Utc>>,
}
