//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any response as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a dollar amount
pub fn format_dollars(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Color severity based on value
pub fn color_severity(severity: &str) -> String {
    match severity.to_lowercase().as_str() {
        "high" => severity.red().bold().to_string(),
        "medium" => severity.yellow().to_string(),
        "low" => severity.green().to_string(),
        _ => severity.to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Truncate text to `max` characters for table cells
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Running cluster: analytics", 12), "Running c...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2026-03-01T08:15:00Z"), "2026-03-01 08:15");
        assert_eq!(format_timestamp("not a time"), "not a time");
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(3500.0), "$3500.00");
    }
}
