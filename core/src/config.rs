//! Configuration
//!
//! Loaded from an optional TOML file (`--config`, or `stepjs.toml` in the
//! working directory) and `STEPJS__*` environment variables, e.g.
//! `STEPJS__CLI__MAX_STEPS=500` or `STEPJS__INTERPRETER__CALL_SCOPING=chained`.
//! Builder overrides win over both.

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::executor::{CallScoping, InterpreterConfig};

const ENV_PREFIX: &str = "STEPJS";
const DEFAULT_FILE: &str = "stepjs";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub cli: CliConfig,
}

/// Settings for the command-line driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Stop stepping after this many visible steps. The interpreter itself
    /// has no limit.
    pub max_steps: usize,
    /// Print log entries as they are produced
    pub show_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            show_logs: true,
        }
    }
}

impl Config {
    /// Load from the default file (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    call_scoping: Option<CallScoping>,
    max_steps: Option<usize>,
    use_env: Option<bool>,
}

impl ConfigBuilder {
    /// Read this file instead of `stepjs.toml`; it must exist
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn call_scoping(mut self, scoping: CallScoping) -> Self {
        self.call_scoping = Some(scoping);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Skip `STEPJS__*` environment variables
    pub fn without_env(mut self) -> Self {
        self.use_env = Some(false);
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let mut builder = config::Config::builder();

        builder = match &self.config_path {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        if self.use_env.unwrap_or(true) {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        if let Some(scoping) = self.call_scoping {
            let value = match scoping {
                CallScoping::Snapshot => "snapshot",
                CallScoping::Chained => "chained",
            };
            builder = builder.set_override("interpreter.call_scoping", value)?;
        }
        if let Some(max_steps) = self.max_steps {
            builder = builder.set_override("cli.max_steps", max_steps as u64)?;
        }

        builder.build()?.try_deserialize()
    }
}
