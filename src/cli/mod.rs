//! CLI module for the mesh
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the mesh server
//! - `providers` - List providers or register an endpoint
//! - `market` - Show the market snapshot
//! - `route` - Route a single prompt through the mesh
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! mesh serve
//!
//! # Discover, probe and list online providers
//! mesh providers list --status online
//!
//! # Send one prompt to the cheapest provider
//! mesh route "Hello there" --strategy cost_based
//! ```

pub mod completions;
pub mod config;
pub mod market;
pub mod output;
pub mod providers;
pub mod route;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::MeshConfig;
use crate::routing::SelectionStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Provider discovery and load-balanced routing for AI inference
#[derive(Parser, Debug)]
#[command(
    name = "mesh",
    version,
    about = "Provider discovery and load-balanced routing for AI inference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the mesh server
    Serve(ServeArgs),
    /// Inspect or register providers
    #[command(subcommand)]
    Providers(ProvidersCommands),
    /// Show the market snapshot
    Market(MarketArgs),
    /// Route one prompt through the mesh
    Route(RouteArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "mesh.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "MESH_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "MESH_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MESH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable the seed discovery loop
    #[arg(long)]
    pub no_discovery: bool,

    /// Disable health probing
    #[arg(long)]
    pub no_health_check: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProvidersCommands {
    /// List configured and discovered providers
    List(ProvidersListArgs),
    /// Describe and probe an endpoint, optionally registering it with a running server
    Add(ProvidersAddArgs),
}

#[derive(Args, Debug)]
pub struct ProvidersListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Filter by status (online, offline, unknown)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Skip the discovery and probe pass
    #[arg(long)]
    pub no_probe: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "mesh.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProvidersAddArgs {
    /// Provider endpoint (e.g., http://localhost:3001)
    pub endpoint: String,

    /// Register with a running mesh server instead of probing locally
    #[arg(long)]
    pub server: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "mesh.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the discovery and probe pass
    #[arg(long)]
    pub no_probe: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "mesh.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Prompt sent as a single user message
    pub prompt: String,

    /// Selection strategy (latency_based, round_robin, cost_based, explicit:<id>)
    #[arg(short, long)]
    pub strategy: Option<SelectionStrategy>,

    /// Pin the request to one provider id
    #[arg(short, long, conflicts_with = "strategy")]
    pub provider: Option<String>,

    /// Dispatch attempts allowed after the first one
    #[arg(short = 'r', long)]
    pub max_retries: Option<u32>,

    /// Never make a last-resort call to a non-online provider
    #[arg(long)]
    pub no_fallback: bool,

    /// Reputation (0-100) the first choice needs
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_reputation: Option<u8>,

    /// Model hint forwarded to the provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the routing decision without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "mesh.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "mesh.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,

    /// Seed endpoint to poll for providers (repeatable)
    #[arg(short, long = "seed")]
    pub seeds: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file when present, else defaults, then apply `MESH_*`
/// overrides and validate.
pub fn load_config(path: &Path) -> Result<MeshConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        MeshConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        MeshConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["mesh", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("mesh.toml"));
                assert!(!args.no_discovery);
                assert!(!args.no_health_check);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["mesh", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_providers_list() {
        let cli =
            Cli::try_parse_from(["mesh", "providers", "list", "--json", "--no-probe"]).unwrap();
        match cli.command {
            Commands::Providers(ProvidersCommands::List(args)) => {
                assert!(args.json);
                assert!(args.no_probe);
                assert!(args.status.is_none());
            }
            _ => panic!("Expected Providers List command"),
        }
    }

    #[test]
    fn test_cli_parse_providers_add() {
        let cli = Cli::try_parse_from([
            "mesh",
            "providers",
            "add",
            "http://10.0.0.5:3001",
            "--server",
            "http://localhost:8400",
        ])
        .unwrap();
        match cli.command {
            Commands::Providers(ProvidersCommands::Add(args)) => {
                assert_eq!(args.endpoint, "http://10.0.0.5:3001");
                assert_eq!(args.server.as_deref(), Some("http://localhost:8400"));
            }
            _ => panic!("Expected Providers Add command"),
        }
    }

    #[test]
    fn test_cli_parse_route_with_strategy() {
        let cli = Cli::try_parse_from([
            "mesh",
            "route",
            "hello",
            "--strategy",
            "cost_based",
            "--max-retries",
            "0",
            "--no-fallback",
        ])
        .unwrap();
        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.prompt, "hello");
                assert_eq!(args.strategy, Some(SelectionStrategy::CostBased));
                assert_eq!(args.max_retries, Some(0));
                assert!(args.no_fallback);
            }
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_cli_parse_route_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["mesh", "route", "hi", "--strategy", "smart"]).is_err());
    }

    #[test]
    fn test_cli_parse_route_provider_conflicts_with_strategy() {
        assert!(Cli::try_parse_from([
            "mesh",
            "route",
            "hi",
            "--provider",
            "a",
            "--strategy",
            "round_robin"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["mesh", "config", "init", "-o", "custom.toml"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert_eq!(args.output, PathBuf::from("custom.toml"));
                assert!(!args.force);
                assert!(args.seeds.is_empty());
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("definitely-missing-mesh.toml")).unwrap();
        assert_eq!(config.discovery.default_price_per_1k, 0.001);
        assert!(config.providers.is_empty());
    }
}
