//! Output formatting helpers for CLI commands

use crate::market::{MarketSnapshot, MarketSummary};
use crate::registry::{Provider, ProviderStatus};
use crate::routing::{AttemptOutcome, AttemptRecord};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for provider display
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderView {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub kind: String,
    pub region: String,
    pub status: ProviderStatus,
    pub latency_ms: u32,
    pub price_per_1k: f64,
    pub reputation: u8,
    pub uptime: f64,
    pub models: Vec<String>,
}

impl From<&Provider> for ProviderView {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id.clone(),
            name: provider.name.clone(),
            endpoint: provider.endpoint.clone(),
            kind: provider.kind.label().to_string(),
            region: provider.region.clone(),
            status: provider.status,
            latency_ms: provider.latency_ms,
            price_per_1k: provider.price_per_1k,
            reputation: provider.reputation,
            uptime: provider.uptime,
            models: provider.models.clone(),
        }
    }
}

fn status_cell(status: ProviderStatus) -> String {
    match status {
        ProviderStatus::Online => "online".green().to_string(),
        ProviderStatus::Offline => "offline".red().to_string(),
        ProviderStatus::Unknown => "unknown".yellow().to_string(),
    }
}

/// Format providers as a table
pub fn format_providers_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "ID", "Endpoint", "Kind", "Region", "Status", "Latency", "Price/1k", "Reputation",
        "Models",
    ]);

    for p in providers {
        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(&p.endpoint),
            Cell::new(&p.kind),
            Cell::new(&p.region),
            Cell::new(status_cell(p.status)),
            Cell::new(format!("{}ms", p.latency_ms)),
            Cell::new(format!("{:.4}", p.price_per_1k)),
            Cell::new(p.reputation),
            Cell::new(p.models.len()),
        ]);
    }

    table.to_string()
}

/// Format providers as JSON
pub fn format_providers_json(providers: &[ProviderView]) -> String {
    json!({ "providers": providers }).to_string()
}

/// Format the market summary as a two-column table.
pub fn format_market_table(snapshot: &MarketSnapshot) -> String {
    let MarketSummary {
        total_providers,
        online_providers,
        average_latency_ms,
        lowest_latency_ms,
        highest_latency_ms,
        average_price,
        lowest_price,
        highest_price,
        total_capacity,
    } = &snapshot.summary;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Providers"),
        Cell::new(format!("{} ({} online)", total_providers, online_providers)),
    ]);
    table.add_row(vec![
        Cell::new("Average latency"),
        Cell::new(format!("{:.0}ms", average_latency_ms)),
    ]);
    table.add_row(vec![
        Cell::new("Latency range"),
        Cell::new(format!("{}ms - {}ms", lowest_latency_ms, highest_latency_ms)),
    ]);
    table.add_row(vec![
        Cell::new("Average price/1k"),
        Cell::new(format!("{:.4}", average_price)),
    ]);
    table.add_row(vec![
        Cell::new("Price range/1k"),
        Cell::new(format!("{:.4} - {:.4}", lowest_price, highest_price)),
    ]);
    table.add_row(vec![Cell::new("Capacity"), Cell::new(total_capacity)]);

    format!(
        "{}\nSnapshot at {}",
        table,
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Format dispatch attempts as a table
pub fn format_attempts_table(attempts: &[AttemptRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Provider", "Outcome", "Latency", "Detail"]);

    for (i, a) in attempts.iter().enumerate() {
        let outcome = match &a.outcome {
            AttemptOutcome::Success => "success".green().to_string(),
            AttemptOutcome::Rejected(_) => "rejected".red().to_string(),
            other => other.label().yellow().to_string(),
        };
        let detail = if a.last_resort {
            format!("{} (last resort)", a.outcome.reason())
        } else {
            a.outcome.reason()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&a.provider_id),
            Cell::new(outcome),
            Cell::new(format!("{}ms", a.latency_ms)),
            Cell::new(detail),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_view() -> ProviderView {
        ProviderView {
            id: "node-localhost-3001".to_string(),
            name: "localhost:3001".to_string(),
            endpoint: "http://localhost:3001".to_string(),
            kind: "local".to_string(),
            region: "Local".to_string(),
            status: ProviderStatus::Online,
            latency_ms: 42,
            price_per_1k: 0.001,
            reputation: 100,
            uptime: 100.0,
            models: vec!["llama3".to_string()],
        }
    }

    #[test]
    fn test_format_providers_table_empty() {
        let output = format_providers_table(&[]);
        assert!(output.contains("Endpoint"));
    }

    #[test]
    fn test_format_providers_table_with_data() {
        let output = format_providers_table(&[create_test_view()]);
        assert!(output.contains("node-localhost-3001"));
        assert!(output.contains("online"));
        assert!(output.contains("42ms"));
    }

    #[test]
    fn test_format_providers_json_valid() {
        let output = format_providers_json(&[create_test_view()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["providers"][0]["status"], "online");
    }

    #[test]
    fn test_format_market_table() {
        let snapshot = MarketSnapshot::from_providers(vec![], Utc::now());
        let output = format_market_table(&snapshot);
        assert!(output.contains("0 (0 online)"));
        assert!(output.contains("Snapshot at"));
    }

    #[test]
    fn test_format_attempts_table_marks_last_resort() {
        let attempts = vec![AttemptRecord {
            provider_id: "a".to_string(),
            endpoint: "http://a:3001".to_string(),
            latency_ms: 12,
            outcome: AttemptOutcome::Failed("connection refused".to_string()),
            last_resort: true,
        }];
        let output = format_attempts_table(&attempts);
        assert!(output.contains("connection refused (last resort)"));
    }
}
