use anyhow::{Context, Result};
use catalog_common::workdir::StepWorkDir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_LFN_BASE, POOL_CATALOG_FILE,
    STEP_CATALOG_FILE,
};
use crate::pool::OutputPattern;
use config::{Config as RConfig, Environment, File, FileFormat};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Master catalog of the run; none means the run starts from an empty catalog.
    pub master_catalog: Option<PathBuf>,
    pub step_catalog_file: String,
    pub pool_catalog_file: String,

    /// LFN directory outputs found in a work directory are registered under.
    pub output_lfn_base: String,
    pub output_prefix: Option<String>,
    pub output_types: Vec<String>,

    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn step_workdir(&self, path: impl Into<PathBuf>) -> StepWorkDir {
        StepWorkDir::with_file_names(path, &self.step_catalog_file, &self.pool_catalog_file)
    }

    /// The naming pattern of step outputs, when output types are configured.
    pub fn output_pattern(&self) -> Result<Option<OutputPattern>> {
        if self.output_types.is_empty() {
            return Ok(None);
        }
        let prefix = self.output_prefix.as_deref().unwrap_or_default();
        let pattern = OutputPattern::new(prefix, &self.output_types)
            .context("invalid output naming pattern")?;
        Ok(Some(pattern))
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = RConfig::builder()
            .set_default("master_catalog", Some(None::<String>))?
            .set_default("step_catalog_file", STEP_CATALOG_FILE)?
            .set_default("pool_catalog_file", POOL_CATALOG_FILE)?
            .set_default("output_lfn_base", DEFAULT_OUTPUT_LFN_BASE)?
            .set_default("output_prefix", Some(None::<String>))?
            .set_default::<&str, Vec<&str>>("output_types", vec![])?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("log_dir", Some(None::<String>))?;
        Ok(builder)
    }

    fn environment() -> Environment {
        Environment::with_prefix(CONFIG_ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("output_types")
    }

    pub fn load_default_config() -> Result<Config> {
        Self::builder()?
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
            .context("failed to parse configuration")
    }

    /// Defaults, then the TOML file at `path` (when given), then `REPLICA_CATALOG_*`
    /// environment variables.
    pub fn load_config(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Self::load_default_config();
        };
        Self::builder()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(Self::environment())
            .build()
            .with_context(|| format!("failed to read config file {:?}", path))?
            .try_deserialize()
            .with_context(|| format!("failed to parse config file {:?}", path))
    }
}
