//! Unified provider error handling
//!
//! Single error type for every model backend the gateway talks to.
//!
//! | Variant | Purpose | Backend unreachable |
//! |------|------|--------|
//! | Authentication | Authentication failed | No |
//! | RateLimit | Rate limit exceeded | No |
//! | ModelNotFound | Model not found | No |
//! | InvalidRequest | Invalid request | No |
//! | Network | Connection-level failure | Yes |
//! | Timeout | Request timed out | Yes |
//! | ProviderUnavailable | Backend refused service | Yes |
//! | ApiError | Other non-success HTTP status | No |
//! | ResponseParsing | Malformed response body | No |
//! | Configuration | Misconfigured model entry | No |

/// Unified provider error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: &'static str,
        message: String,
    },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: &'static str,
        message: String,
    },

    #[error("Model '{model}' not found for {provider}")]
    ModelNotFound {
        provider: &'static str,
        model: String,
    },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },

    #[error("Network error for {provider}: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("Configuration error for {provider}: {message}")]
    Configuration {
        provider: &'static str,
        message: String,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },

    /// API error with status code
    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Create authentication error
    pub fn authentication(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    pub fn provider_unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn configuration(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
        }
    }

    pub fn timeout(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    pub fn api_error(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider,
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status onto the closest variant
    pub fn from_status(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::InvalidRequest { provider, message },
            401 | 403 => Self::authentication(provider, message),
            404 => Self::ModelNotFound {
                provider,
                model: message,
            },
            429 => Self::RateLimit { provider, message },
            503 => Self::provider_unavailable(provider, message),
            _ => Self::api_error(provider, status, message),
        }
    }

    /// The backend could not be reached at all, as opposed to rejecting one request
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::ProviderUnavailable { .. }
        )
    }
}
