//! Motor nameplate configuration.
//!
//! The record is read once at start-up from a TOML file whose keys follow
//! the nameplate symbols used on the laboratory handout:
//!
//! ```toml
//! Rf = 181.5
//! Ra = 0.114
//! UN = 220
//! IN = 90.5
//! PN = 17000
//! nN = 3000
//! error_sigma = 1
//! ```
//!
//! Every field is required. Unknown keys are rejected so that a typo cannot
//! silently fall back to a default.

use std::path::Path;

use serde_derive::Deserialize;

use crate::error::{ArmatureError, Result};

/// Nameplate data plus the measurement-noise level.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorConfig {
    /// Rated field-circuit resistance (Ω).
    #[serde(rename = "Rf")]
    pub rf: f64,
    /// Armature resistance (Ω).
    #[serde(rename = "Ra")]
    pub ra: f64,
    /// Rated voltage (V).
    #[serde(rename = "UN")]
    pub u_n: f64,
    /// Rated line current (A), armature plus field.
    #[serde(rename = "IN")]
    pub i_n: f64,
    /// Rated output power (W).
    #[serde(rename = "PN")]
    pub p_n: f64,
    /// Rated speed (r/min).
    #[serde(rename = "nN")]
    pub n_n: f64,
    /// Standard deviation of the armature current reading (A).
    pub error_sigma: f64,
}

impl MotorConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArmatureError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded motor config");
        Self::parse(&text)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let config: MotorConfig =
            toml::from_str(text).map_err(|e| ArmatureError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("Rf", self.rf),
            ("Ra", self.ra),
            ("UN", self.u_n),
            ("IN", self.i_n),
            ("PN", self.p_n),
            ("nN", self.n_n),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ArmatureError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.error_sigma.is_finite() || self.error_sigma < 0.0 {
            return Err(ArmatureError::Config(format!(
                "error_sigma must be a non-negative number, got {}",
                self.error_sigma
            )));
        }
        Ok(())
    }
}
