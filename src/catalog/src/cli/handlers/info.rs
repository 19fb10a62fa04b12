use super::load_manager;
use crate::config::Config;
use anyhow::Result;
use catalog_common::Colorize;

pub fn info(config: &Config, json: bool) -> Result<()> {
    let manager = load_manager(config)?;
    let catalog = manager.master();
    let remote = catalog
        .iter()
        .filter(|(_, entry)| entry.first_replica().url.is_remote())
        .count();
    let total_bytes: u64 = catalog.iter().filter_map(|(_, entry)| entry.size_bytes()).sum();

    if json {
        let value = serde_json::json!({
            "config": config,
            "catalog": {
                "entries": catalog.len(),
                "remote_entries": remote,
                "local_entries": catalog.len() - remote,
                "known_size_bytes": total_bytes,
            },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let master = config
        .master_catalog
        .as_ref()
        .map(|path| format!("{:?}", path))
        .unwrap_or_else(|| "not set (empty catalog)".to_string());
    println!("{}", "Replica catalog".bold());
    println!("  {:<20} {}", "Master catalog", master);
    println!("  {:<20} {}", "Step catalog file", config.step_catalog_file);
    println!("  {:<20} {}", "Pool catalog file", config.pool_catalog_file);
    println!("  {:<20} {}", "Output LFN base", config.output_lfn_base);
    if !config.output_types.is_empty() {
        println!(
            "  {:<20} {}*.{{{}}}",
            "Output pattern",
            config.output_prefix.as_deref().unwrap_or_default(),
            config.output_types.join(",")
        );
    }
    println!();
    println!("  {:<20} {}", "Entries", catalog.len().to_string().green());
    println!("  {:<20} {}", "Local first replica", catalog.len() - remote);
    println!("  {:<20} {}", "Remote first replica", remote);
    println!("  {:<20} {}", "Known size (bytes)", total_bytes);
    Ok(())
}
