//! Service health

use anyhow::Result;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_json, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health) = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Status:      {}", color_status(&health.status));
            println!("Source:      {}", configured(health.source_configured));
            println!("Reasoning:   {}", configured(health.reasoning_configured));
            println!();

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&component.status),
                    message: component.message.clone().unwrap_or_default(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

fn configured(flag: bool) -> &'static str {
    if flag {
        "configured"
    } else {
        "not configured"
    }
}
