//! Trigger a new analysis

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;
use crate::commands::recommendations::print_table;
use crate::output::{format_timestamp, print_info, print_json, print_success, print_warning, OutputFormat};

pub async fn run_analysis(client: &ApiClient, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Table = format {
        print_info("Running analysis, this can take a few minutes...");
    }

    let response = client.analyze().await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            let report = &response.summary;
            print_success(&format!(
                "Analysis complete: {} recommendations from {} resources",
                report.recommendation_count, report.total_resources
            ));
            println!(
                "Type:       {}",
                if report.analysis_type == "ai" {
                    report.analysis_type.cyan()
                } else {
                    report.analysis_type.normal()
                }
            );
            println!("Timestamp:  {}", format_timestamp(&report.timestamp));
            if report.reasoning_available && report.analysis_type != "ai" {
                print_warning("Reasoning was configured but fell back to rule-based analysis");
            }

            let counts: Vec<String> = report
                .resource_counts
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect();
            if !counts.is_empty() {
                println!("Resources:  {}", counts.join(", "));
            }
            println!();

            print_table(&response.recommendations);
        }
    }

    Ok(())
}
