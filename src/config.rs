//! Parameters file.
//!
//! A single YAML document holding the generation parameters and the
//! config-driven producers:
//!
//! ```yaml
//! seed: 42
//! collection_size_range: { min: 1, max: 3 }
//! max_depth: 4
//! producers:
//!   - field: Customer.email
//!     generator:
//!       type: pattern
//!       pattern: "customer_{index}@example.com"
//! ```

use crate::args::GenerateArgs;
use anyhow::Context;
use fixture_generator::{Parameters, ProducerBinding};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a parameters file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    /// Generation parameters; missing keys take their defaults
    #[serde(flatten)]
    pub parameters: Parameters,

    /// Producers bound to types or fields
    #[serde(default)]
    pub producers: Vec<ProducerBinding>,
}

impl FileConfig {
    /// Parse a parameters file from YAML.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse parameters")
    }

    /// Load a parameters file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameters from {path:?}"))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid parameters file {path:?}"))
    }

    /// Load the file if given, else use the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line values over the file values.
    pub fn apply_overrides(&mut self, args: &GenerateArgs) {
        if let Some(seed) = args.seed {
            self.parameters.seed = seed;
        }
        if let Some(max_depth) = args.max_depth {
            self.parameters.max_depth = max_depth;
        }
    }
}
