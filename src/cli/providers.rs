//! Providers command handlers

use crate::api::{AddProviderRequest, AppState};
use crate::cli::output::{format_providers_json, format_providers_table, ProviderView};
use crate::cli::{load_config, ProvidersAddArgs, ProvidersListArgs};
use crate::registry::ProviderStatus;

/// Handle `mesh providers list`.
///
/// Builds the registry from configuration, runs one discovery cycle unless
/// `--no-probe` is given, then prints the (optionally filtered) providers.
pub async fn handle_providers_list(
    args: &ProvidersListArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let status_filter = args
        .status
        .as_deref()
        .map(str::parse::<ProviderStatus>)
        .transpose()?;

    let config = load_config(&args.config)?;
    let state = AppState::from_config(config)?;

    if !args.no_probe {
        let summary = state.discovery.run_cycle().await;
        tracing::debug!(?summary, "Discovery cycle complete");
    }

    let views: Vec<ProviderView> = state
        .registry
        .list()
        .iter()
        .filter(|p| status_filter.map_or(true, |s| p.status == s))
        .map(ProviderView::from)
        .collect();

    if args.json {
        Ok(format_providers_json(&views))
    } else if views.is_empty() {
        Ok("No providers found.".to_string())
    } else {
        Ok(format_providers_table(&views))
    }
}

/// Handle `mesh providers add`.
///
/// With `--server` the endpoint is registered with a running mesh; otherwise
/// it is described and probed locally and the result printed.
pub async fn handle_providers_add(
    args: &ProvidersAddArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(server) = &args.server {
        let provider = register_remote(server, &args.endpoint).await?;
        if args.json {
            return Ok(serde_json::to_string_pretty(&provider)?);
        }
        return Ok(format!(
            "Provider '{}' registered with {} ({})",
            provider["id"].as_str().unwrap_or_default(),
            server,
            provider["status"].as_str().unwrap_or("unknown")
        ));
    }

    let config = load_config(&args.config)?;
    let state = AppState::from_config(config)?;
    let provider = state.discovery.refresh_endpoint(&args.endpoint).await?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&provider)?);
    }

    Ok(format!(
        "Provider '{}' is {}\n{}",
        provider.id,
        provider.status,
        format_providers_table(&[ProviderView::from(&provider)])
    ))
}

async fn register_remote(
    server: &str,
    endpoint: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let url = format!("{}/v1/providers", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&AddProviderRequest {
            endpoint: endpoint.to_string(),
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("server returned {}: {}", status, body).into());
    }

    Ok(response.json::<serde_json::Value>().await?)
}
