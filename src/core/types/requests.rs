//! Generation request parameters

use serde::{Deserialize, Serialize};

/// Sampling parameters applied uniformly to every task of a job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Nucleus sampling parameter (0.0 - 1.0)
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

impl GenerationParams {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(format!(
                "top_p must be between 0.0 and 1.0, got {}",
                self.top_p
            ));
        }
        Ok(())
    }
}
