use crate::constants::LOCAL_STORAGE_ELEMENT;
use crate::errors::{CatalogError, Result, ValidationError};
use crate::model::{
    CatalogEntry, Checksum, Guid, LogicalFileName, MergeReport, PhysicalFileName, Replica,
    ReplicaCatalog, StorageElementId,
};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// How an application names its outputs: `<prefix>*.<type>`, types matched case-insensitively.
#[derive(Debug, Clone)]
pub struct OutputPattern {
    prefix: String,
    types: Vec<String>,
    regex: Regex,
}

impl OutputPattern {
    pub fn new(prefix: &str, types: &[String]) -> std::result::Result<Self, ValidationError> {
        let types: Vec<String> = types
            .iter()
            .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if types.is_empty() {
            return Err(ValidationError::new(
                "output_types",
                "at least one output type is required",
            ));
        }
        let alternatives: Vec<String> = types.iter().map(|t| regex::escape(t)).collect();
        let regex = Regex::new(&format!(
            r"^{}.*\.(?i:{})$",
            regex::escape(prefix),
            alternatives.join("|")
        ))
        .map_err(|e| ValidationError::new("output_types", e.to_string()))?;
        Ok(Self {
            prefix: prefix.to_string(),
            types,
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

fn output_lfn(
    lfn_base: &str,
    file_name: &str,
) -> std::result::Result<LogicalFileName, ValidationError> {
    LogicalFileName::new(&format!("{}/{}", lfn_base.trim_end_matches('/'), file_name))
}

/// Registers the files in `workdir` that look like outputs and are not yet cataloged under
/// any LFN. Each gets a fresh GUID, a single `LocalDisk` replica and its observed size.
pub fn register_outputs(
    catalog: &mut ReplicaCatalog,
    workdir: &Path,
    pattern: &OutputPattern,
    lfn_base: &str,
) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let files = WalkDir::new(workdir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file());

    for file in files {
        let Some(file_name) = file.file_name().to_str() else {
            continue;
        };
        if !pattern.matches(file_name) {
            continue;
        }
        let url = PhysicalFileName::from_local_path(file.path())?;
        if let Some(lfn) = catalog.find_by_url(&url) {
            debug!("Output {} is already cataloged as {}", file_name, lfn);
            continue;
        }

        let size = file
            .metadata()
            .map_err(|e| CatalogError::io(file.path(), e.into()))?
            .len();
        let lfn = output_lfn(lfn_base, file_name)?;
        let replica = Replica::new(url, StorageElementId::new(LOCAL_STORAGE_ELEMENT)?);
        let entry = match catalog.get(&lfn) {
            Some(existing) => existing.clone().with_additional_replicas([replica]),
            None => CatalogEntry::new(
                vec![replica],
                Some(size),
                Some(Checksum::with_guid(Guid::generate())),
            )?,
        };
        info!("Registering output {} as {}", file_name, lfn);
        let outcome = catalog.upsert(lfn.clone(), entry);
        report.record(lfn, outcome);
    }
    Ok(report)
}
