//! Console configuration.
//!
//! Defaults suit an interactive terminal. A JSON file may override any
//! subset of fields, and command-line flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sink::{CONSOLE_MARKER, LOG_MARKER};

/// Which console flavour renders the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable text straight to the terminal
    #[default]
    Plain,
    /// Every line escaped and marked for a machine consumer
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Messages at or below this level are shown.
    pub verbosity: u32,
    pub mode: OutputMode,
    /// Record marker for console text in quoted mode.
    pub console_marker: String,
    /// Record marker for log/error text in quoted mode.
    pub log_marker: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            mode: OutputMode::Plain,
            console_marker: CONSOLE_MARKER.to_string(),
            log_marker: LOG_MARKER.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("invalid render config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Check that the quoted-mode markers can be told apart by a consumer.
    pub fn validate(&self) -> Result<()> {
        for marker in [&self.console_marker, &self.log_marker] {
            if marker.is_empty() {
                bail!("record markers must not be empty");
            }
            if marker.contains('"') || marker.contains('\n') {
                bail!("record marker {marker:?} contains a quote or newline");
            }
        }
        if self.console_marker == self.log_marker {
            bail!(
                "console and log markers must differ, both are {:?}",
                self.console_marker
            );
        }
        Ok(())
    }
}
