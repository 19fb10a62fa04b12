use crate::errors::{CatalogError, Result, ValidationError};
use crate::model::entry::{CatalogEntry, RawCatalogEntry};
use crate::model::lfn::LogicalFileName;
use crate::model::pfn::PhysicalFileName;
use catalog_common::fs::{read_optional, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

type RawCatalog = BTreeMap<String, RawCatalogEntry>;

/// What happened to one entry when it was merged into a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The LFN was new.
    Inserted,
    /// The LFN existed with a different value, which was replaced.
    Overwritten,
    /// The LFN existed with an identical value.
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: Vec<LogicalFileName>,
    pub overwritten: Vec<LogicalFileName>,
    pub unchanged: Vec<LogicalFileName>,
}

impl MergeReport {
    pub fn record(&mut self, lfn: LogicalFileName, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted.push(lfn),
            MergeOutcome::Overwritten => self.overwritten.push(lfn),
            MergeOutcome::Unchanged => self.unchanged.push(lfn),
        }
    }

    /// True when merging left the target catalog unchanged.
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.overwritten.is_empty()
    }
}

/// A mapping from logical file names to their catalog entries.
///
/// Keys are normalized LFNs and iteration is in LFN order, so serialized catalogs are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog", into = "RawCatalog")]
pub struct ReplicaCatalog {
    entries: BTreeMap<LogicalFileName, CatalogEntry>,
}

impl ReplicaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, lfn: &LogicalFileName) -> Option<&CatalogEntry> {
        self.entries.get(lfn)
    }

    pub fn contains(&self, lfn: &LogicalFileName) -> bool {
        self.entries.contains_key(lfn)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LogicalFileName, &CatalogEntry)> {
        self.entries.iter()
    }

    pub fn lfns(&self) -> impl Iterator<Item = &LogicalFileName> {
        self.entries.keys()
    }

    /// Looks up the LFN of a logical reference, with or without its `LFN:` prefix.
    pub fn lookup(&self, reference: &str) -> Option<(&LogicalFileName, &CatalogEntry)> {
        let lfn = LogicalFileName::new(reference).ok()?;
        self.entries.get_key_value(&lfn)
    }

    /// Finds the LFN of an entry listing `url` among its replicas.
    pub fn find_by_url(&self, url: &PhysicalFileName) -> Option<&LogicalFileName> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.has_replica(url))
            .map(|(lfn, _)| lfn)
    }

    /// Inserts or replaces an entry, returning the previous one.
    pub fn insert(&mut self, lfn: LogicalFileName, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(lfn, entry)
    }

    /// Applies the merge policy to a single entry: insert new LFNs, overwrite value-different
    /// entries, skip identical ones.
    pub fn upsert(&mut self, lfn: LogicalFileName, entry: CatalogEntry) -> MergeOutcome {
        match self.entries.get_mut(&lfn) {
            None => {
                self.entries.insert(lfn, entry);
                MergeOutcome::Inserted
            }
            Some(existing) if *existing == entry => MergeOutcome::Unchanged,
            Some(existing) => {
                *existing = entry;
                MergeOutcome::Overwritten
            }
        }
    }

    /// Merges every entry of `other` into this catalog. The incoming value wins on conflict.
    pub fn merge(&mut self, other: &ReplicaCatalog) -> MergeReport {
        let mut report = MergeReport::default();
        for (lfn, entry) in other.iter() {
            let outcome = self.upsert(lfn.clone(), entry.clone());
            if outcome == MergeOutcome::Overwritten {
                info!("Overwriting catalog entry for {} with the merged value", lfn);
            }
            report.record(lfn.clone(), outcome);
        }
        report
    }

    /// A copy holding only the entries for `lfns`, plus the requested LFNs that were not found.
    pub fn subset<'a>(
        &self,
        lfns: impl IntoIterator<Item = &'a LogicalFileName>,
    ) -> (ReplicaCatalog, Vec<LogicalFileName>) {
        let mut subset = ReplicaCatalog::new();
        let mut missing = Vec::new();
        for lfn in lfns {
            match self.entries.get(lfn) {
                Some(entry) => {
                    subset.entries.insert(lfn.clone(), entry.clone());
                }
                None => missing.push(lfn.clone()),
            }
        }
        (subset, missing)
    }

    /// Parses and validates a catalog document. `origin` names the document in errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self> {
        let raw: RawCatalog =
            serde_json::from_str(json).map_err(|source| CatalogError::Malformed {
                origin: origin.to_string(),
                source,
            })?;
        Ok(Self::try_from(raw)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| CatalogError::Malformed {
            origin: "<serialization>".to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let catalog = Self::from_json_str(&json, &path.display().to_string())?;
        debug!("Loaded {} catalog entries from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Loads a catalog, returning `None` when the file does not exist.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        match read_optional(path).map_err(|e| CatalogError::io(path, e))? {
            Some(json) => Ok(Some(Self::from_json_str(
                &json,
                &path.display().to_string(),
            )?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        write_atomic(path, json.as_bytes()).map_err(|e| CatalogError::io(path, e))?;
        debug!("Wrote {} catalog entries to {:?}", self.len(), path);
        Ok(())
    }
}

impl TryFrom<RawCatalog> for ReplicaCatalog {
    type Error = ValidationError;

    fn try_from(raw: RawCatalog) -> std::result::Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, raw_entry) in raw {
            let lfn = LogicalFileName::new(&key).map_err(|e| e.within(format!("{:?}", key)))?;
            let entry =
                CatalogEntry::try_from(raw_entry).map_err(|e| e.within(format!("{:?}", key)))?;
            if entries.insert(lfn.clone(), entry).is_some() {
                return Err(ValidationError::new(
                    format!("{:?}", key),
                    format!("LFN {} is listed more than once", lfn),
                ));
            }
        }
        Ok(Self { entries })
    }
}

impl From<ReplicaCatalog> for RawCatalog {
    fn from(catalog: ReplicaCatalog) -> Self {
        catalog
            .entries
            .into_iter()
            .map(|(lfn, entry)| (lfn.into(), entry.into()))
            .collect()
    }
}

impl FromIterator<(LogicalFileName, CatalogEntry)> for ReplicaCatalog {
    fn from_iter<T: IntoIterator<Item = (LogicalFileName, CatalogEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
