//! Resource listings straight from the workspace

use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_info, print_json, truncate, OutputFormat};

/// Resource kinds with a listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryKind {
    Clusters,
    Jobs,
    SqlWarehouses,
    Pools,
    VectorSearch,
    Policies,
    Apps,
    Lakebase,
    MlJobs,
    ModelServing,
}

impl InventoryKind {
    pub fn path(&self) -> &'static str {
        match self {
            InventoryKind::Clusters => "clusters",
            InventoryKind::Jobs => "jobs",
            InventoryKind::SqlWarehouses => "sql-warehouses",
            InventoryKind::Pools => "pools",
            InventoryKind::VectorSearch => "vector-search",
            InventoryKind::Policies => "policies",
            InventoryKind::Apps => "apps",
            InventoryKind::Lakebase => "lakebase",
            InventoryKind::MlJobs => "ml-jobs",
            InventoryKind::ModelServing => "model-serving",
        }
    }

    /// Keys tried in order for the id and name columns
    fn id_keys(&self) -> &'static [&'static str] {
        match self {
            InventoryKind::Clusters => &["cluster_id"],
            InventoryKind::Jobs | InventoryKind::MlJobs => &["job_id"],
            InventoryKind::Pools => &["instance_pool_id"],
            InventoryKind::Policies => &["policy_id"],
            InventoryKind::Lakebase => &["uid", "name"],
            _ => &["id", "name"],
        }
    }

    fn name_keys(&self) -> &'static [&'static str] {
        match self {
            InventoryKind::Clusters => &["cluster_name"],
            InventoryKind::Pools => &["instance_pool_name"],
            _ => &["name"],
        }
    }
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

/// First present key as display text
fn field(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "-".to_string())
}

/// State lives at the top level, or in a nested status block
fn state(item: &Value) -> String {
    if let Some(Value::String(s)) = item.get("state") {
        return s.clone();
    }
    ["endpoint_status", "app_status", "state"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find(|block| block.is_object())
        .map(|block| field(block, &["state", "ready"]))
        .unwrap_or_else(|| field(item, &["status"]))
}

fn rows(kind: InventoryKind, items: &[Value]) -> Vec<ResourceRow> {
    items
        .iter()
        .map(|item| {
            let name = match kind {
                InventoryKind::Jobs | InventoryKind::MlJobs => item
                    .get("settings")
                    .map(|s| field(s, &["name"]))
                    .unwrap_or_else(|| "-".to_string()),
                _ => field(item, kind.name_keys()),
            };
            ResourceRow {
                id: truncate(&field(item, kind.id_keys()), 36),
                name: truncate(&name, 40),
                state: color_status(&state(item)),
            }
        })
        .collect()
}

fn print_rows(rows: Vec<ResourceRow>) {
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

pub async fn show_inventory(
    client: &ApiClient,
    kind: InventoryKind,
    format: OutputFormat,
) -> Result<()> {
    let items = client.listing(kind.path()).await?;

    match format {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Table => {
            if items.is_empty() {
                print_info(&format!("No {} found.", kind.path()));
                return Ok(());
            }
            print_rows(rows(kind, &items));
            println!("Total: {}", items.len());
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "Run")]
    run_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

fn run_rows(runs: &[Value]) -> Vec<RunRow> {
    runs.iter()
        .map(|run| {
            let start = run.get("start_time").and_then(Value::as_i64);
            let end = run.get("end_time").and_then(Value::as_i64);
            let duration = match (start, end) {
                (Some(start), Some(end)) if start > 0 && end > start => {
                    format!("{:.0}s", (end - start) as f64 / 1000.0)
                }
                _ => "-".to_string(),
            };
            let state = run
                .get("state")
                .map(|s| field(s, &["result_state", "life_cycle_state"]))
                .unwrap_or_else(|| "-".to_string());
            RunRow {
                run_id: field(run, &["run_id"]),
                state,
                duration,
            }
        })
        .collect()
}

pub async fn show_runs(
    client: &ApiClient,
    job_id: i64,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let runs = client.job_runs(job_id, limit).await?;

    match format {
        OutputFormat::Json => print_json(&runs)?,
        OutputFormat::Table => {
            if runs.is_empty() {
                print_info(&format!("No runs found for job {}.", job_id));
                return Ok(());
            }
            let table = tabled::Table::new(run_rows(&runs))
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
