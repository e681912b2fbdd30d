//! Virtual machine configuration
//!
//! Every field has a default matching the reference interpreter, so an
//! empty JSON object is a valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of cells on the tape
pub const DEFAULT_TAPE_SIZE: usize = 4096;

/// Default starting cell of the pointer
pub const DEFAULT_START_POINTER: usize = 0;

/// What an `Input` instruction stores once the input stream is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EofPolicy {
    /// Store -1, like a C-style `getchar`
    #[default]
    MinusOne,
    /// Store 0
    Zero,
    /// Leave the cell untouched
    Unchanged,
}

/// Configuration for one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Number of signed 32-bit cells on the tape
    pub tape_size: usize,
    /// Cell the pointer starts at
    pub start_pointer: usize,
    /// Value stored by `Input` at end of input
    pub eof: EofPolicy,
    /// Maximum number of executed instructions (`None` = unlimited)
    pub max_steps: Option<u64>,
    /// Run the linear loop optimizer before executing
    pub optimize: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            start_pointer: DEFAULT_START_POINTER,
            eof: EofPolicy::default(),
            max_steps: None,
            optimize: true,
        }
    }
}

impl VmConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: VmConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Check that the pointer starts on the tape
    pub fn validate(&self) -> Result<()> {
        if self.tape_size == 0 {
            return Err(Error::config("tape_size must be at least 1"));
        }
        if self.start_pointer >= self.tape_size {
            return Err(Error::config(format!(
                "start_pointer {} is outside a tape of {} cells",
                self.start_pointer, self.tape_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VmConfig::default();
        assert_eq!(config.tape_size, 4096);
        assert_eq!(config.start_pointer, 0);
        assert_eq!(config.eof, EofPolicy::MinusOne);
        assert!(config.optimize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(VmConfig::from_json_str("{}").unwrap(), VmConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            VmConfig::from_json_str(r#"{"tape_size": 30000, "start_pointer": 15000, "eof": "zero"}"#)
                .unwrap();
        assert_eq!(config.tape_size, 30000);
        assert_eq!(config.start_pointer, 15000);
        assert_eq!(config.eof, EofPolicy::Zero);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn test_start_outside_tape_is_rejected() {
        let err = VmConfig::from_json_str(r#"{"tape_size": 8, "start_pointer": 8}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(VmConfig::from_json_str(r#"{"cells": 10}"#).is_err());
    }
}
