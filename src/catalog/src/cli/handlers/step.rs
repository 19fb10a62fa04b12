use super::{load_manager, master_path};
use crate::config::Config;
use crate::model::ReplicaCatalog;
use crate::pool::register_outputs as register_step_outputs;
use crate::step::inputs::StepInputs;
use anyhow::{Context, Result};
use catalog_common::{info_message, success_message, warning_message};
use std::path::Path;

pub fn prepare(config: &Config, workdir: &Path, inputs: &Path, step: &str) -> Result<()> {
    let mut manager = load_manager(config)?;
    let document = std::fs::read_to_string(inputs)
        .with_context(|| format!("failed to read step inputs {:?}", inputs))?;
    let document: serde_json::Value = serde_json::from_str(&document)
        .with_context(|| format!("step inputs {:?} are not valid JSON", inputs))?;
    let inputs = StepInputs::from_json(document)?;

    let workdir = config.step_workdir(workdir);
    let report = manager.prepare(step, &inputs, &workdir)?;
    for lfn in &report.missing {
        warning_message!("{} is not in the master catalog", lfn);
    }
    match &report.catalog_path {
        Some(path) => success_message!(
            "Step catalog with {} entries written to {:?}",
            report.found.len(),
            path
        ),
        None => warning_message!(
            "Working directory {:?} does not exist, no step catalog written",
            workdir.as_path()
        ),
    }
    Ok(())
}

pub fn merge(config: &Config, workdir: &Path) -> Result<()> {
    let master = master_path(config)?;
    let mut manager = load_manager(config)?;
    let report = manager.merge_external(&config.step_workdir(workdir))?;
    if report.is_noop() {
        info_message!("Nothing to merge from {:?}", workdir);
        return Ok(());
    }
    manager.save(master)?;
    success_message!(
        "Merged {} new and {} updated entries into {:?}",
        report.inserted.len(),
        report.overwritten.len(),
        master
    );
    Ok(())
}

pub fn register_outputs(config: &Config, workdir: &Path) -> Result<()> {
    let pattern = config
        .output_pattern()?
        .context("no output types configured; pass --type or set output_types")?;
    let workdir = config.step_workdir(workdir);
    let mut catalog = ReplicaCatalog::load_optional(&workdir.catalog_file)?.unwrap_or_default();

    let report = register_step_outputs(
        &mut catalog,
        workdir.as_path(),
        &pattern,
        &config.output_lfn_base,
    )?;
    if report.is_noop() {
        info_message!("No new outputs in {:?}", workdir.as_path());
        return Ok(());
    }
    catalog.save(&workdir.catalog_file)?;
    for lfn in &report.inserted {
        success_message!("Registered {}", lfn);
    }
    Ok(())
}
