// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Validation enforcement configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How validation failures are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Failures reject the item
    Strict,
    /// Failures are recorded as warnings; items are accepted
    #[default]
    Advisory,
    /// No validation is performed
    Disabled,
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnforcementMode::Strict => f.write_str("strict"),
            EnforcementMode::Advisory => f.write_str("advisory"),
            EnforcementMode::Disabled => f.write_str("disabled"),
        }
    }
}

impl FromStr for EnforcementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(EnforcementMode::Strict),
            "advisory" => Ok(EnforcementMode::Advisory),
            "disabled" => Ok(EnforcementMode::Disabled),
            other => Err(format!("unknown enforcement mode '{}'", other)),
        }
    }
}

/// Configuration for batch validation behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Enforcement mode
    pub mode: EnforcementMode,

    /// Whether advisory failures are logged as warnings
    pub log_warnings: bool,

    /// Whether a batch stops at the first rejected item
    pub stop_on_first_error: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: EnforcementMode::Advisory,
            log_warnings: true,
            stop_on_first_error: false,
        }
    }
}

impl ValidationConfig {
    /// Create a strict configuration
    pub fn strict() -> Self {
        Self {
            mode: EnforcementMode::Strict,
            log_warnings: true,
            stop_on_first_error: false,
        }
    }

    /// Create an advisory configuration
    pub fn advisory() -> Self {
        Self::default()
    }

    /// Create a disabled configuration
    pub fn disabled() -> Self {
        Self {
            mode: EnforcementMode::Disabled,
            log_warnings: false,
            stop_on_first_error: false,
        }
    }

    pub fn with_mode(mut self, mode: EnforcementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
        self
    }

    /// Check if validation should be performed at all
    pub fn should_validate(&self) -> bool {
        self.mode != EnforcementMode::Disabled
    }

    /// Check if validation errors should reject items
    pub fn should_block_on_error(&self) -> bool {
        self.mode == EnforcementMode::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert_eq!(config.mode, EnforcementMode::Strict);
        assert!(config.should_validate());
        assert!(config.should_block_on_error());
    }

    #[test]
    fn test_advisory_config() {
        let config = ValidationConfig::advisory();
        assert_eq!(config.mode, EnforcementMode::Advisory);
        assert!(config.should_validate());
        assert!(!config.should_block_on_error());
    }

    #[test]
    fn test_disabled_config() {
        let config = ValidationConfig::disabled();
        assert!(!config.should_validate());
        assert!(!config.log_warnings);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Strict".parse::<EnforcementMode>(), Ok(EnforcementMode::Strict));
        assert!("lenient".parse::<EnforcementMode>().is_err());
    }
}
