//! Route command handler

use crate::agent::InferenceRequest;
use crate::api::AppState;
use crate::cli::output::format_attempts_table;
use crate::cli::{load_config, RouteArgs};
use crate::routing::{RouteOptions, SelectionStrategy};
use serde_json::json;

/// Merge command-line overrides onto the configured routing defaults.
pub fn route_options(args: &RouteArgs, base: RouteOptions) -> RouteOptions {
    let mut options = base;
    if let Some(strategy) = &args.strategy {
        options.strategy = strategy.clone();
    }
    if let Some(id) = &args.provider {
        options.strategy = SelectionStrategy::Explicit(id.clone());
    }
    if let Some(retries) = args.max_retries {
        options.max_retries = retries;
    }
    if args.no_fallback {
        options.fallback_to_any = false;
    }
    if let Some(floor) = args.min_reputation {
        options.min_reputation = floor;
    }
    options
}

/// Handle `mesh route`.
///
/// Discovers and probes once, then routes the prompt exactly as the server
/// would and prints the answer with the attempts that led to it. With
/// `--dry-run` only the decision is printed.
pub async fn handle_route(args: &RouteArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let options = route_options(args, config.routing.route_options());
    let state = AppState::from_config(config)?;

    state.discovery.run_cycle().await;

    if args.dry_run {
        let decision = state.router.decide(&options)?;
        if args.json {
            return Ok(serde_json::to_string_pretty(&decision)?);
        }
        let mut output = format!("{} via {}", decision.provider_id, decision.strategy);
        if !decision.fallbacks.is_empty() {
            output.push_str(&format!("\nFallbacks: {}", decision.fallbacks.join(", ")));
        }
        return Ok(output);
    }

    let mut request = InferenceRequest::from_prompt(args.prompt.as_str());
    if let Some(model) = &args.model {
        request = request.with_model(model.as_str());
    }

    let routed = match state.router.route(request, &options).await {
        Ok(routed) => routed,
        Err(e) if e.attempts().is_empty() => return Err(e.into()),
        Err(e) => {
            return Err(format!("{}\n{}", e, format_attempts_table(e.attempts())).into());
        }
    };

    if args.json {
        let body = json!({
            "provider_id": routed.provider_id,
            "endpoint": routed.endpoint,
            "response": routed.response,
            "attempts": routed.attempts,
        });
        return Ok(serde_json::to_string_pretty(&body)?);
    }

    Ok(format!(
        "{}\n\nServed by {} ({})\n{}",
        routed.response.content().unwrap_or_default(),
        routed.provider_id,
        routed.endpoint,
        format_attempts_table(&routed.attempts)
    ))
}
