//! Market command handler

use crate::api::AppState;
use crate::cli::output::{format_market_table, format_providers_table, ProviderView};
use crate::cli::{load_config, MarketArgs};
use crate::market;

/// Handle `mesh market`.
pub async fn handle_market(args: &MarketArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let state = AppState::from_config(config)?;

    if !args.no_probe {
        state.discovery.run_cycle().await;
    }

    let snapshot = market::snapshot(&state.registry);

    if args.json {
        return Ok(serde_json::to_string_pretty(&snapshot)?);
    }

    let mut output = format_market_table(&snapshot);
    if !snapshot.providers.is_empty() {
        let views: Vec<ProviderView> = snapshot.providers.iter().map(ProviderView::from).collect();
        output.push('\n');
        output.push_str(&format_providers_table(&views));
    }
    Ok(output)
}
