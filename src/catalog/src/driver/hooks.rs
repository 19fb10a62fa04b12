use super::ExecutionHook;
use crate::constants::POOL_CATALOG_OPTION;
use crate::model::ReplicaCatalog;
use crate::pool::{merge_pool_xml, register_outputs, to_pool_xml, OutputPattern};
use anyhow::{Context, Result};
use catalog_common::fs::write_atomic;
use catalog_common::workdir::StepWorkDir;
use tracing::{debug, info};

/// Lets applications that only understand pool XML catalogs take part in the catalog.
///
/// Before the step the step catalog is rendered as pool XML and its path is passed on the
/// command line. Afterwards whatever the application wrote to the pool catalog, plus outputs
/// found by naming pattern, is folded back into the step catalog for the merge.
#[derive(Debug, Clone)]
pub struct PoolCatalogHook {
    output_pattern: Option<OutputPattern>,
    output_lfn_base: String,
}

impl PoolCatalogHook {
    pub fn new(output_pattern: Option<OutputPattern>, output_lfn_base: impl Into<String>) -> Self {
        Self {
            output_pattern,
            output_lfn_base: output_lfn_base.into(),
        }
    }

    fn load_step_catalog(workdir: &StepWorkDir) -> Result<ReplicaCatalog> {
        Ok(ReplicaCatalog::load_optional(&workdir.catalog_file)?.unwrap_or_default())
    }
}

impl ExecutionHook for PoolCatalogHook {
    fn name(&self) -> &str {
        "pool catalog"
    }

    fn pre_process(&self, mut command: Vec<String>, workdir: &StepWorkDir) -> Result<Vec<String>> {
        if !workdir.exists() {
            return Ok(command);
        }
        let catalog = Self::load_step_catalog(workdir)?;
        let xml = to_pool_xml(&catalog)?;
        write_atomic(&workdir.pool_catalog_file, xml.as_bytes()).with_context(|| {
            format!("failed to write pool catalog {:?}", workdir.pool_catalog_file)
        })?;
        debug!(
            "Wrote {} entries to pool catalog {:?}",
            catalog.len(),
            workdir.pool_catalog_file
        );

        command.push(POOL_CATALOG_OPTION.to_string());
        command.push(workdir.pool_catalog_file.to_string_lossy().into_owned());
        Ok(command)
    }

    fn post_process(&self, workdir: &StepWorkDir) -> Result<()> {
        if !workdir.exists() {
            return Ok(());
        }
        let mut catalog = Self::load_step_catalog(workdir)?;
        let before = catalog.clone();

        if workdir.has_pool_catalog() {
            let xml = std::fs::read_to_string(&workdir.pool_catalog_file).with_context(|| {
                format!("failed to read pool catalog {:?}", workdir.pool_catalog_file)
            })?;
            let report = merge_pool_xml(&mut catalog, &xml, workdir.as_path())?;
            debug!(
                "Pool catalog: {} new, {} updated entries",
                report.inserted.len(),
                report.overwritten.len()
            );
        }
        if let Some(pattern) = &self.output_pattern {
            let report =
                register_outputs(&mut catalog, workdir.as_path(), pattern, &self.output_lfn_base)?;
            if !report.inserted.is_empty() {
                info!("Registered {} outputs by file name", report.inserted.len());
            }
        }

        if catalog != before || !workdir.has_catalog() {
            catalog.save(&workdir.catalog_file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogicalFileName;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn workdir_with_catalog() -> (TempDir, StepWorkDir) {
        let dir = TempDir::new().unwrap();
        let workdir = StepWorkDir::new(dir.path());
        fs::write(
            &workdir.catalog_file,
            json!({
                "/lhcb/MC/input.sim": {
                    "replicas": [{"url": "root://eos.example.org//lhcb/MC/input.sim", "se": "CERN"}],
                    "checksum": {"adler32": null, "guid": "6F1C1E4A-3C2B-4F3A-9D7E-0123456789AB"}
                }
            })
            .to_string(),
        )
        .unwrap();
        (dir, workdir)
    }

    #[test]
    fn test_pre_process_writes_pool_catalog() {
        let (_dir, workdir) = workdir_with_catalog();
        let hook = PoolCatalogHook::new(None, "/");

        let command = hook
            .pre_process(vec!["lb-prod-run".to_string()], &workdir)
            .unwrap();

        assert_eq!(
            command,
            vec![
                "lb-prod-run".to_string(),
                "--pool-xml-catalog".to_string(),
                workdir.pool_catalog_file.to_string_lossy().into_owned(),
            ]
        );
        let xml = fs::read_to_string(&workdir.pool_catalog_file).unwrap();
        assert!(xml.contains(r#"<lfn name="/lhcb/MC/input.sim"/>"#));
        assert!(xml.contains(r#"<File ID="6F1C1E4A-3C2B-4F3A-9D7E-0123456789AB">"#));
    }

    #[test]
    fn test_post_process_collects_outputs() {
        let (dir, workdir) = workdir_with_catalog();
        let pattern = OutputPattern::new("Boole_", &["digi".to_string()]).unwrap();
        let hook = PoolCatalogHook::new(Some(pattern), "/lhcb/MC/2024");
        hook.pre_process(Vec::new(), &workdir).unwrap();

        // the application records one output in the pool catalog and leaves another unlisted
        fs::write(dir.path().join("Boole_1.digi"), b"digi").unwrap();
        fs::write(dir.path().join("Boole_2.digi"), b"more digi").unwrap();
        let xml = fs::read_to_string(&workdir.pool_catalog_file).unwrap().replace(
            "</POOLFILECATALOG>",
            r#"<File ID="0A1B2C3D-4E5F-4A6B-8C7D-9E0F1A2B3C4D">
  <physical><pfn filetype="DIGI" name="Boole_1.digi"/></physical>
  <logical><lfn name="/lhcb/MC/2024/Boole_1.digi"/></logical>
</File>
</POOLFILECATALOG>"#,
        );
        fs::write(&workdir.pool_catalog_file, xml).unwrap();

        hook.post_process(&workdir).unwrap();

        let catalog = ReplicaCatalog::load(&workdir.catalog_file).unwrap();
        let lfns: Vec<_> = catalog.lfns().map(LogicalFileName::as_str).collect();
        assert_eq!(
            lfns,
            vec![
                "/lhcb/MC/2024/Boole_1.digi",
                "/lhcb/MC/2024/Boole_2.digi",
                "/lhcb/MC/input.sim",
            ]
        );
        let listed = catalog
            .lookup("/lhcb/MC/2024/Boole_1.digi")
            .map(|(_, entry)| entry)
            .unwrap();
        assert_eq!(
            listed.guid().map(|g| g.as_str()),
            Some("0A1B2C3D-4E5F-4A6B-8C7D-9E0F1A2B3C4D")
        );
        assert_eq!(listed.size_bytes(), Some(4));
    }

    #[test]
    fn test_bare_path_input_survives_the_pool_round_trip() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.raw");
        fs::write(&input, b"raw").unwrap();
        let workdir = StepWorkDir::new(dir.path());
        fs::write(
            &workdir.catalog_file,
            json!({
                "/exp/input.raw": {
                    "replicas": [{"url": input.to_str().unwrap(), "se": "SE1"}],
                    "size_bytes": 3
                }
            })
            .to_string(),
        )
        .unwrap();
        let before = ReplicaCatalog::load(&workdir.catalog_file).unwrap();
        let hook = PoolCatalogHook::new(None, "/");

        hook.pre_process(Vec::new(), &workdir).unwrap();
        hook.post_process(&workdir).unwrap();

        assert_eq!(ReplicaCatalog::load(&workdir.catalog_file).unwrap(), before);
    }

    #[test]
    fn test_missing_workdir() {
        let dir = TempDir::new().unwrap();
        let workdir = StepWorkDir::new(dir.path().join("missing"));
        let hook = PoolCatalogHook::new(None, "/");
        assert_eq!(
            hook.pre_process(vec!["app".to_string()], &workdir).unwrap(),
            vec!["app".to_string()]
        );
        hook.post_process(&workdir).unwrap();
    }
}
