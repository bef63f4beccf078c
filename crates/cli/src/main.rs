//! Compute Advisor CLI
//!
//! A command-line tool for running analyses and reading the recommendations
//! and savings summary produced by the Compute Advisor service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, health, inventory, recommendations, stats, summary};

/// Compute Advisor CLI
#[derive(Parser)]
#[command(name = "cadv")]
#[command(author, version, about = "CLI for Compute Advisor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via ADVISOR_API_URL env var)
    #[arg(long, env = "ADVISOR_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a new analysis of workspace compute resources
    Analyze,

    /// Show recommendations from the latest analysis
    Recommendations {
        /// Filter by type (cost_leak, value_leak, optimization_opportunity, info)
        #[arg(long = "type", short = 't')]
        kind: Option<String>,

        /// Filter by severity (high, medium, low)
        #[arg(long, short)]
        severity: Option<String>,

        /// Filter by resource type (cluster, job, sql_warehouse, ...)
        #[arg(long, short)]
        resource_type: Option<String>,
    },

    /// Show savings and recommendation summary
    Summary,

    /// Show service health
    Health,

    /// Show live resource counts, including running and idle clusters
    Stats,

    /// List workspace resources of one kind
    Inventory {
        /// Resource kind to list
        #[arg(value_enum)]
        kind: inventory::InventoryKind,
    },

    /// Show recent runs of a job
    Runs {
        /// Job ID
        job_id: i64,

        /// Maximum number of runs
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    let format = config.resolve_format(cli.format);
    let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url))?;

    match cli.command {
        Commands::Analyze => {
            analyze::run_analysis(&client, format).await?;
        }
        Commands::Recommendations {
            kind,
            severity,
            resource_type,
        } => {
            let filters = recommendations::Filters {
                kind,
                severity,
                resource_type,
            };
            recommendations::get_recommendations(&client, filters, format).await?;
        }
        Commands::Summary => {
            summary::show_summary(&client, format).await?;
        }
        Commands::Health => {
            health::show_health(&client, format).await?;
        }
        Commands::Stats => {
            stats::show_stats(&client, format).await?;
        }
        Commands::Inventory { kind } => {
            inventory::show_inventory(&client, kind, format).await?;
        }
        Commands::Runs { job_id, limit } => {
            inventory::show_runs(&client, job_id, limit, format).await?;
        }
    }

    Ok(())
}
