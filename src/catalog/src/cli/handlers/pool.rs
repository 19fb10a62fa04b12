use super::{load_manager, master_path};
use crate::config::Config;
use crate::pool;
use anyhow::{Context, Result};
use catalog_common::fs::write_atomic;
use catalog_common::{info_message, success_message};
use std::path::Path;

pub fn to_pool_xml(config: &Config, output: Option<&Path>) -> Result<()> {
    let manager = load_manager(config)?;
    let xml = pool::to_pool_xml(manager.master())?;
    match output {
        Some(output) => {
            write_atomic(output, xml.as_bytes())
                .with_context(|| format!("failed to write {:?}", output))?;
            success_message!(
                "Wrote {} entries to {:?}",
                manager.master().len(),
                output
            );
        }
        None => print!("{}", xml),
    }
    Ok(())
}

pub fn from_pool_xml(config: &Config, xml_path: &Path, base_dir: Option<&Path>) -> Result<()> {
    let master = master_path(config)?;
    let xml = std::fs::read_to_string(xml_path)
        .with_context(|| format!("failed to read pool catalog {:?}", xml_path))?;
    let base_dir = base_dir
        .or_else(|| xml_path.parent())
        .unwrap_or(Path::new("."));

    let mut catalog = load_manager(config)?.into_master();
    let report = pool::merge_pool_xml(&mut catalog, &xml, base_dir)?;
    if report.is_noop() {
        info_message!("Master catalog already up to date");
        return Ok(());
    }
    catalog.save(master)?;
    success_message!(
        "Merged {} new and {} updated entries into {:?}",
        report.inserted.len(),
        report.overwritten.len(),
        master
    );
    Ok(())
}
