//! Discovery error types

use crate::registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    #[error("{0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
