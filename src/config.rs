//! Optional TOML configuration file.
//!
//! Every field is optional; CLI flags override the file, the file
//! overrides built-in defaults. A missing file at the default location
//! is not an error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "logscope.toml";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Maximum stored entries (0 = unbounded)
    pub capacity: Option<usize>,

    /// Events applied to the store per drain tick
    pub batch_size: Option<usize>,

    /// Drain period in milliseconds
    pub tick_ms: Option<u64>,

    /// Extensions picked up by folder import
    pub extensions: Option<Vec<String>>,
}

impl FileConfig {
    /// Load configuration.
    ///
    /// With an explicit path, the file must exist and parse. Without
    /// one, the default location is tried and silently skipped when
    /// absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
