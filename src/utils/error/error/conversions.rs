//! Type conversions for GatewayError

use super::types::GatewayError;
use crate::core::providers::unified_provider::ProviderError;

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout { message, .. } => GatewayError::Timeout(message),
            other => GatewayError::Provider(other),
        }
    }
}
