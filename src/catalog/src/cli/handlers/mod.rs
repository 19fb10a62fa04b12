mod info;
mod pool;
mod resolve;
mod step;

pub(super) use info::info;
pub(super) use pool::{from_pool_xml, to_pool_xml};
pub(super) use resolve::resolve;
pub(super) use step::{merge, prepare, register_outputs};

use crate::config::Config;
use crate::step::StepCatalogManager;
use anyhow::{Context, Result};
use std::path::Path;

fn load_manager(config: &Config) -> Result<StepCatalogManager> {
    StepCatalogManager::from_path(config.master_catalog.as_deref()).with_context(|| {
        format!(
            "failed to load master catalog {:?}",
            config.master_catalog.as_deref().unwrap_or(Path::new("<none>"))
        )
    })
}

/// The master catalog path, required by commands that change the master catalog.
fn master_path(config: &Config) -> Result<&Path> {
    config.master_catalog.as_deref().context(
        "no master catalog configured; pass --catalog or set master_catalog in the configuration",
    )
}
