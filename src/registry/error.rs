/// Errors that can occur during registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("invalid provider descriptor: {0}")]
    InvalidDescriptor(String),
}
