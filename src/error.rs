use thiserror::Error;

/// Errors that can occur during food data ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// A provider's HTTP call failed or returned a non-success status
    #[error("Provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// A provider returned a response that cannot be parsed into any candidate
    #[error("Malformed payload from provider '{provider}': {reason}")]
    MalformedPayload { provider: String, reason: String },

    /// The catalog merge transaction failed; no partial state was retained
    #[error("Catalog write failed: {0}")]
    CatalogWrite(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl IngestError {
    pub fn provider_unavailable(provider: &str, reason: impl Into<String>) -> Self {
        IngestError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_payload(provider: &str, reason: impl Into<String>) -> Self {
        IngestError::MalformedPayload {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::CatalogWrite(err.to_string())
    }
}
