//! Helper functions for creating and classifying errors

use super::types::GatewayError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn unknown_model<S: Into<String>>(model_id: S) -> Self {
        Self::UnknownModel(model_id.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl GatewayError {
    /// Whether the error comes from the job store / queue being unreachable
    pub fn is_infrastructure(&self) -> bool {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(_) => true,
            Self::Storage(_) | Self::Io(_) => true,
            _ => false,
        }
    }
}
