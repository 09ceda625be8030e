//! Analyzer configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! whatever the command line sets explicitly.

use crate::community::{CommunityDetection, ConnectedComponents, Louvain};
use crate::error::{EchoError, Result};
use crate::parser::EdgeListFormat;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Louvain,
    Components,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub algorithm: Algorithm,
    /// Modularity resolution (gamma). 1.0 is the standard definition.
    pub resolution: f64,
    pub seed: u64,
    pub max_iter: usize,
    pub max_levels: usize,
    pub format: EdgeListFormat,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            algorithm: Algorithm::Louvain,
            resolution: 1.0,
            seed: 42,
            max_iter: 100,
            max_levels: 10,
            format: EdgeListFormat::Whitespace,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(text).map_err(|e| EchoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(EchoError::Config(format!(
                "resolution must be a positive number, got {}",
                self.resolution
            )));
        }
        if self.max_iter == 0 || self.max_levels == 0 {
            return Err(EchoError::Config(
                "max_iter and max_levels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The detector this configuration selects.
    pub fn detector(&self) -> Box<dyn CommunityDetection> {
        match self.algorithm {
            Algorithm::Louvain => Box::new(
                Louvain::new()
                    .with_resolution(self.resolution)
                    .with_max_iter(self.max_iter)
                    .with_max_levels(self.max_levels)
                    .with_seed(self.seed),
            ),
            Algorithm::Components => Box::new(ConnectedComponents),
        }
    }
}
