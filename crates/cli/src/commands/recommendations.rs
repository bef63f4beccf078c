//! Recommendation listing

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, Recommendation};
use crate::output::{
    color_severity, format_timestamp, print_info, print_json, print_warning, truncate,
    OutputFormat,
};

/// Row for recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Est. Savings")]
    savings: String,
    #[tabled(rename = "Risk")]
    risk: String,
}

/// Filters applied client-side to the cached recommendations
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub kind: Option<String>,
    pub severity: Option<String>,
    pub resource_type: Option<String>,
}

impl Filters {
    fn matches(&self, rec: &Recommendation) -> bool {
        let eq = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_ref()
                .map(|w| w.eq_ignore_ascii_case(actual))
                .unwrap_or(true)
        };

        eq(&self.kind, &rec.kind)
            && eq(&self.severity, &rec.severity)
            && eq(&self.resource_type, rec.resource_type.as_deref().unwrap_or(""))
    }

    pub fn apply(&self, recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        recommendations
            .into_iter()
            .filter(|r| self.matches(r))
            .collect()
    }
}

/// Print recommendations as a table
pub fn print_table(recommendations: &[Recommendation]) {
    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .map(|r| RecommendationRow {
            kind: r.kind.clone(),
            severity: color_severity(&r.severity),
            resource: match &r.resource_type {
                Some(t) => format!("{} {}", t, truncate(&r.resource_id_text(), 20)),
                None => "-".to_string(),
            },
            title: truncate(&r.title, 50),
            savings: r.estimated_savings.clone().unwrap_or_default(),
            risk: r.risk.clone(),
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

/// Show the cached recommendations with optional filters
pub async fn get_recommendations(
    client: &ApiClient,
    filters: Filters,
    format: OutputFormat,
) -> Result<()> {
    let cached = client.recommendations().await?;

    if !cached.has_analysis {
        match format {
            OutputFormat::Json => print_json(&cached)?,
            OutputFormat::Table => print_warning(
                cached
                    .message
                    .as_deref()
                    .unwrap_or("No analysis available"),
            ),
        }
        return Ok(());
    }

    let filtered = filters.apply(cached.recommendations);

    match format {
        OutputFormat::Json => print_json(&filtered)?,
        OutputFormat::Table => {
            if filtered.is_empty() {
                print_warning("No recommendations found");
                return Ok(());
            }

            print_table(&filtered);
            println!("\nTotal: {} recommendations", filtered.len());
            if let (Some(kind), Some(ts)) = (&cached.analysis_type, &cached.timestamp) {
                print_info(&format!("{} analysis from {}", kind, format_timestamp(ts)));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(kind: &str, severity: &str, resource_type: Option<&str>) -> Recommendation {
        serde_json::from_value(serde_json::json!({
            "type": kind,
            "severity": severity,
            "title": "t",
            "resource_type": resource_type,
        }))
        .unwrap()
    }

    #[test]
    fn test_filters_combine() {
        let recs = vec![
            rec("cost_leak", "high", Some("cluster")),
            rec("cost_leak", "low", Some("job")),
            rec("value_leak", "high", Some("cluster")),
            rec("info", "low", None),
        ];

        let filters = Filters {
            kind: Some("COST_LEAK".to_string()),
            severity: Some("high".to_string()),
            resource_type: None,
        };
        let filtered = filters.apply(recs.clone());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].resource_type.as_deref(), Some("cluster"));

        let by_resource = Filters {
            resource_type: Some("cluster".to_string()),
            ..Default::default()
        };
        assert_eq!(by_resource.apply(recs.clone()).len(), 2);

        assert_eq!(Filters::default().apply(recs).len(), 4);
    }
}
