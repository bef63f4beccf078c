//! Live resource counts

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, Stats};
use crate::output::{format_timestamp, print_json, OutputFormat};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
}

fn count_rows(stats: &Stats) -> Vec<CountRow> {
    stats
        .counts
        .iter()
        .map(|(kind, count)| CountRow {
            kind: kind.replace('_', " "),
            count: *count,
        })
        .collect()
}

pub async fn show_stats(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let stats = client.stats().await?;

    if let OutputFormat::Json = format {
        return print_json(&stats);
    }

    println!("{}", "Workspace Resources".bold());
    println!("{}", "=".repeat(50));
    println!("As of:                  {}", format_timestamp(&stats.timestamp));
    println!("Running clusters:       {}", stats.running_clusters);
    println!(
        "Idle clusters:          {}",
        stats.idle_clusters.to_string().yellow()
    );
    println!();

    let table = tabled::Table::new(count_rows(&stats))
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    Ok(())
}
