//! Summary of the latest analysis

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, Summary};
use crate::output::{format_dollars, format_timestamp, print_json, print_warning, OutputFormat};

/// Row for the per-type breakdown
#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Savings")]
    savings: String,
}

fn type_rows(summary: &Summary) -> Vec<TypeRow> {
    summary
        .by_type
        .iter()
        .map(|(kind, count)| TypeRow {
            kind: kind.clone(),
            count: *count,
            savings: format_dollars(summary.savings_by_type.get(kind).copied().unwrap_or(0.0)),
        })
        .collect()
}

pub async fn show_summary(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let summary = client.summary().await?;

    if let OutputFormat::Json = format {
        return print_json(&summary);
    }

    if summary.total_recommendations == 0 && !summary.analysis_metadata.has_analysis {
        print_warning("No analysis available. Run `cadv analyze` first.");
        return Ok(());
    }

    println!("{}", "Analysis Summary".bold());
    println!("{}", "=".repeat(50));
    let metadata = &summary.analysis_metadata;
    if let Some(ts) = &metadata.timestamp {
        println!("Analyzed at:            {}", format_timestamp(ts));
    }
    if let Some(kind) = &metadata.analysis_type {
        println!("Analysis type:          {}", kind.cyan());
    }
    println!(
        "Scope:                  {} jobs, {} clusters",
        metadata.jobs_analyzed, metadata.clusters_analyzed
    );
    println!();

    println!("{}", "Recommendations".bold());
    println!("{}", "-".repeat(50));
    println!("Total:                  {}", summary.total_recommendations);
    println!(
        "High priority:          {}",
        summary.success_metrics.high_priority_actions.to_string().red()
    );
    println!(
        "Coverage:               {}",
        summary.success_metrics.optimization_coverage
    );
    println!();

    println!(
        "{} {}",
        "Potential Monthly Savings:".bold(),
        summary.total_cost_savings_formatted.green().bold()
    );
    println!();

    let table = tabled::Table::new(type_rows(&summary))
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    Ok(())
}
