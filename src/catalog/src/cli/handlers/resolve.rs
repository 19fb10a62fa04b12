use super::load_manager;
use crate::config::Config;
use crate::resolver::Resolution;
use anyhow::Result;
use catalog_common::warning_message;

pub fn resolve(config: &Config, reference: &str, json: bool) -> Result<()> {
    let manager = load_manager(config)?;
    let resolution = crate::resolver::resolve(reference, manager.master());

    if json {
        let value = serde_json::json!({
            "reference": reference,
            "value": resolution.value(),
            "is_remote": resolution.is_remote(),
            "resolved": resolution.is_resolved(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if let Resolution::Unresolved(lfn) = &resolution {
        warning_message!("{} is not in the master catalog", lfn);
    }
    let location = if resolution.is_remote() { "remote" } else { "local" };
    println!("{}\t{}", resolution.value(), location);
    Ok(())
}
