//! Compute mesh - provider discovery and load-balanced routing for AI inference
//!
//! This library keeps a live registry of inference providers (local scheduler
//! nodes and cloud APIs), probes their health, aggregates a market view of
//! price and latency, and routes each request to the best available provider
//! with bounded failover.

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod health;
pub mod logging;
pub mod market;
pub mod metrics;
pub mod registry;
pub mod routing;
