//! Plain-text rendering of dashboard data for the terminal.

use crate::domain::optimization::OptimizationResult;
use crate::domain::portfolio::{HealthReport, PerformancePoint, Portfolio};
use std::fmt::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn money(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    // Saturates at the i64 range for absurd values.
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i != 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn health_line(report: &HealthReport) -> String {
    let mut out = if report.is_ok() {
        "API: online".to_string()
    } else {
        format!("API: degraded ({})", report.status)
    };
    if let Some(version) = &report.version {
        let _ = write!(out, " v{version}");
    }
    out
}

pub fn portfolio_table(portfolios: &[Portfolio]) -> String {
    if portfolios.is_empty() {
        return "No portfolios found.\n".to_string();
    }

    let name_width = portfolios
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<name_width$}  {:>16}  {:>6}  {:<8}",
        "ID", "Name", "Value", "Risk", "Status"
    );
    for p in portfolios {
        let value = p.current_value.map(money).unwrap_or_else(|| "-".to_string());
        let status = if p.is_active { "active" } else { "inactive" };
        let _ = writeln!(
            out,
            "{:>5}  {:<name_width$}  {:>16}  {:>6.2}  {:<8}",
            p.id, p.name, value, p.risk_tolerance, status
        );
    }
    out
}

/// Maps values onto eight block heights. A flat series renders mid-height.
pub fn sparkline(values: &[f64]) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return String::new();
    };

    let span = max - min;
    finite
        .iter()
        .map(|v| {
            if span == 0.0 {
                return SPARK_LEVELS[SPARK_LEVELS.len() / 2];
            }
            let idx = (((v - min) / span) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Performance rows oldest first, with a total-return sparkline on top.
pub fn performance_table(points: &[PerformancePoint]) -> String {
    if points.is_empty() {
        return "No performance data.\n".to_string();
    }

    let mut sorted: Vec<&PerformancePoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.timestamp);

    let returns: Vec<f64> = sorted.iter().map(|p| p.total_return).collect();
    let mut out = String::new();
    let _ = writeln!(out, "Total return  {}", sparkline(&returns));
    let _ = writeln!(
        out,
        "{:<16}  {:>12}  {:>8}  {:>12}",
        "Date", "Total return", "Sharpe", "Max drawdown"
    );
    for p in sorted {
        let _ = writeln!(
            out,
            "{:<16}  {:>12}  {:>8.2}  {:>12}",
            p.timestamp.format("%Y-%m-%d %H:%M"),
            percent(p.total_return),
            p.sharpe_ratio,
            percent(p.max_drawdown)
        );
    }
    out
}

pub fn progress_bar(progress: f64, width: usize) -> String {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let filled = (p * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        p * 100.0
    )
}

pub fn optimization_summary(result: &OptimizationResult) -> String {
    let m = &result.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "Optimization result for strategy {}", result.strategy_id);
    if let Some(ts) = result.timestamp {
        let _ = writeln!(out, "  finished      {}", ts.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    let _ = writeln!(out, "  sharpe ratio  {:.2}", m.sharpe_ratio);
    let _ = writeln!(out, "  total return  {}", percent(m.total_return));
    let _ = writeln!(out, "  max drawdown  {}", percent(m.max_drawdown));
    let _ = writeln!(out, "  win rate      {}", percent(m.win_rate));

    if !result.parameters.is_empty() {
        let _ = writeln!(out, "Parameters");
        let key_width = result.parameters.keys().map(|k| k.len()).max().unwrap_or(0);
        for (key, value) in &result.parameters {
            let _ = writeln!(out, "  {key:<key_width$}  {value}");
        }
    }
    out
}
