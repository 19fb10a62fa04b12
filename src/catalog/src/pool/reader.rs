use super::{
    FILE_ELEMENT, ID_ATTRIBUTE, LFN_ELEMENT, LOGICAL_ELEMENT, NAME_ATTRIBUTE, PFN_ELEMENT,
    PHYSICAL_ELEMENT,
};
use crate::constants::{LOCAL_STORAGE_ELEMENT, UNKNOWN_STORAGE_ELEMENT};
use crate::errors::{CatalogError, Result, ValidationError};
use crate::model::{
    CatalogEntry, Checksum, Guid, LogicalFileName, MergeOutcome, MergeReport, PhysicalFileName,
    Replica, ReplicaCatalog, StorageElementId,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Physical,
    Logical,
}

/// One `File` element as written, before validation.
#[derive(Debug, Default)]
struct PoolRecord {
    id: Option<String>,
    pfns: Vec<String>,
    lfn: Option<String>,
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(CatalogError::pool_xml)?;
        if attribute.key.as_ref() == name.as_bytes() {
            let value = attribute.unescape_value().map_err(CatalogError::pool_xml)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_name(element: &BytesStart<'_>, tag: &str) -> Result<String> {
    attribute(element, NAME_ATTRIBUTE)?
        .ok_or_else(|| CatalogError::pool_xml(format!("<{}> without a name attribute", tag)))
}

fn parse_records(xml: &str) -> Result<Vec<PoolRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<PoolRecord> = None;
    let mut section: Option<Section> = None;
    loop {
        let event = reader.read_event().map_err(|e| {
            CatalogError::pool_xml(format!("at position {}: {}", reader.buffer_position(), e))
        })?;
        let (element, is_empty) = match event {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(element) => {
                let name = element.name();
                if name.as_ref() == FILE_ELEMENT.as_bytes() {
                    records.extend(current.take());
                } else if name.as_ref() == PHYSICAL_ELEMENT.as_bytes()
                    || name.as_ref() == LOGICAL_ELEMENT.as_bytes()
                {
                    section = None;
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        match std::str::from_utf8(element.name().as_ref()).unwrap_or_default() {
            FILE_ELEMENT => {
                if current.is_some() {
                    return Err(CatalogError::pool_xml("nested <File> elements"));
                }
                let record = PoolRecord {
                    id: attribute(&element, ID_ATTRIBUTE)?.filter(|id| !id.trim().is_empty()),
                    ..Default::default()
                };
                if is_empty {
                    records.push(record);
                } else {
                    current = Some(record);
                }
            }
            PHYSICAL_ELEMENT if !is_empty => section = Some(Section::Physical),
            LOGICAL_ELEMENT if !is_empty => section = Some(Section::Logical),
            PFN_ELEMENT => match (current.as_mut(), section) {
                (Some(record), Some(Section::Physical)) => {
                    record.pfns.push(required_name(&element, PFN_ELEMENT)?)
                }
                _ => return Err(CatalogError::pool_xml("<pfn> outside a <physical> section")),
            },
            LFN_ELEMENT => match (current.as_mut(), section) {
                (Some(record), Some(Section::Logical)) => {
                    let lfn = required_name(&element, LFN_ELEMENT)?;
                    // a record maps one logical name; extra ones are ignored
                    record.lfn.get_or_insert(lfn);
                }
                _ => return Err(CatalogError::pool_xml("<lfn> outside a <logical> section")),
            },
            _ => {}
        }
    }
    if current.is_some() {
        return Err(CatalogError::pool_xml("unterminated <File> element"));
    }
    Ok(records)
}

fn storage_element_for(url: &PhysicalFileName) -> Result<StorageElementId> {
    let name = if url.is_remote() {
        UNKNOWN_STORAGE_ELEMENT
    } else {
        LOCAL_STORAGE_ELEMENT
    };
    Ok(StorageElementId::new(name)?)
}

/// Size of the first replica that is a regular local file.
fn local_size(replicas: &[Replica]) -> Option<u64> {
    replicas
        .iter()
        .filter_map(|replica| replica.url.local_path())
        .find_map(|path| {
            std::fs::metadata(path)
                .ok()
                .filter(|metadata| metadata.is_file())
                .map(|metadata| metadata.len())
        })
}

impl PoolRecord {
    fn lfn(&self, replicas: &[Replica]) -> Result<LogicalFileName> {
        if let Some(lfn) = &self.lfn {
            return Ok(LogicalFileName::new(lfn)?);
        }
        let base_name = replicas
            .first()
            .and_then(|replica| replica.url.as_str().rsplit('/').next())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CatalogError::pool_xml("<File> record with neither a logical name nor a replica")
            })?;
        let lfn = LogicalFileName::new(&format!("/{}", base_name))?;
        debug!("Pool record without logical name, using {}", lfn);
        Ok(lfn)
    }

    /// Validates the record and merges it with what `catalog` already knows about its LFN.
    fn into_entry(
        self,
        catalog: &ReplicaCatalog,
        base_dir: &Path,
    ) -> Result<(LogicalFileName, CatalogEntry)> {
        let replicas = self
            .pfns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let url = PhysicalFileName::from_external(name, base_dir)
                    .map_err(|e| e.within(format!("pfn[{}]", i)))?;
                let storage_element = storage_element_for(&url)?;
                Ok(Replica::new(url, storage_element))
            })
            .collect::<Result<Vec<_>>>()?;
        let lfn = self.lfn(&replicas)?;
        let guid = self
            .id
            .as_deref()
            .map(Guid::new)
            .transpose()
            .map_err(|e| ValidationError::within(e, format!("File[{}]", lfn)))?;

        let entry = match catalog.get(&lfn) {
            Some(existing) => existing.clone().with_additional_replicas(replicas),
            None => {
                let checksum = guid.clone().map(Checksum::with_guid);
                CatalogEntry::new(replicas, None, checksum)
                    .map_err(|e| e.within(format!("File[{}]", lfn)))?
            }
        };
        let entry = match guid {
            Some(guid) if entry.guid() != Some(&guid) => entry.with_guid(guid),
            _ => entry,
        };
        let entry = match entry.size_bytes() {
            Some(_) => entry,
            None => {
                let size = local_size(entry.replicas());
                entry.with_size_bytes(size)
            }
        };
        Ok((lfn, entry))
    }
}

/// Merges the records of a pool XML catalog into `catalog` with the same policy as a step
/// merge. Replicas of an already known LFN are appended when their URL is new. Either every
/// record is merged or, on error, the catalog is left untouched.
pub fn merge_pool_xml(
    catalog: &mut ReplicaCatalog,
    xml: &str,
    base_dir: &Path,
) -> Result<MergeReport> {
    let mut updated = catalog.clone();
    let mut report = MergeReport::default();
    for record in parse_records(xml)? {
        let (lfn, entry) = record.into_entry(&updated, base_dir)?;
        let outcome = updated.upsert(lfn.clone(), entry);
        if outcome == MergeOutcome::Overwritten {
            info!("Updated catalog entry for {} from the pool XML catalog", lfn);
        }
        report.record(lfn, outcome);
    }
    *catalog = updated;
    Ok(report)
}

/// Reads a pool XML catalog on top of `existing` and returns the updated catalog.
pub fn from_pool_xml(
    xml: &str,
    existing: ReplicaCatalog,
    base_dir: &Path,
) -> Result<ReplicaCatalog> {
    let mut catalog = existing;
    merge_pool_xml(&mut catalog, xml, base_dir)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    const GUID: &str = "6F1C1E4A-3C2B-4F3A-9D7E-0123456789AB";

    fn lfn(value: &str) -> LogicalFileName {
        LogicalFileName::new(value).unwrap()
    }

    fn urls(entry: &CatalogEntry) -> Vec<&str> {
        entry.replicas().iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_new_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.sim"), b"0123456789").unwrap();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<!DOCTYPE POOLFILECATALOG SYSTEM "InMemory">
<POOLFILECATALOG>
  <File ID="{}">
    <physical>
      <pfn filetype="SIM" name="out.sim"/>
    </physical>
    <logical>
      <lfn name="/lhcb/MC/out.sim"/>
    </logical>
  </File>
  <File ID="">
    <physical>
      <pfn name="root://eos.example.org//lhcb/other.dst"/>
    </physical>
    <logical/>
  </File>
</POOLFILECATALOG>"#,
            GUID.to_lowercase()
        );

        let catalog = from_pool_xml(&xml, ReplicaCatalog::new(), dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let sim = catalog.get(&lfn("/lhcb/MC/out.sim")).unwrap();
        assert_eq!(
            urls(sim),
            vec![format!("file://{}", dir.path().join("out.sim").display())]
        );
        assert_eq!(sim.first_replica().storage_element.as_str(), "LocalDisk");
        assert_eq!(sim.guid().map(Guid::as_str), Some(GUID));
        assert_eq!(sim.size_bytes(), Some(10));

        // no logical section: the LFN is made up from the replica's file name
        let dst = catalog.get(&lfn("/other.dst")).unwrap();
        assert_eq!(dst.first_replica().storage_element.as_str(), "Unknown");
        assert_eq!(dst.guid(), None);
        assert_eq!(dst.size_bytes(), None);
    }

    #[test]
    fn test_replicas_are_appended_to_known_lfns() {
        let existing = json!({
            "/lhcb/data/run.dst": {
                "replicas": [{"url": "root://eos.example.org//lhcb/data/run.dst", "se": "CERN-DST"}],
                "size_bytes": 42,
                "checksum": {"adler32": "788c5caa", "guid": null}
            }
        });
        let mut catalog = ReplicaCatalog::from_json_str(&existing.to_string(), "test").unwrap();
        let xml = format!(
            r#"<POOLFILECATALOG>
  <File ID="{}">
    <physical>
      <pfn name="root://eos.example.org//lhcb/data/run.dst"/>
      <pfn name="file:///scratch/run.dst"/>
    </physical>
    <logical><lfn name="LFN:/lhcb/data/run.dst"/></logical>
  </File>
</POOLFILECATALOG>"#,
            GUID
        );

        let report = merge_pool_xml(&mut catalog, &xml, Path::new("/work")).unwrap();
        assert_eq!(report.overwritten, vec![lfn("/lhcb/data/run.dst")]);

        let entry = catalog.get(&lfn("/lhcb/data/run.dst")).unwrap();
        assert_eq!(
            urls(entry),
            vec!["root://eos.example.org//lhcb/data/run.dst", "file:///scratch/run.dst"]
        );
        assert_eq!(entry.size_bytes(), Some(42));
        assert_eq!(
            entry.checksum().and_then(|c| c.adler32.as_ref()).map(|a| a.as_str()),
            Some("788c5caa")
        );
        assert_eq!(entry.guid().map(Guid::as_str), Some(GUID));

        // reading the same document again is a no-op
        let report = merge_pool_xml(&mut catalog, &xml, Path::new("/work")).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_missing_size_is_taken_from_a_new_local_replica() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.dst"), b"0123456789abcdef").unwrap();
        let existing = json!({
            "/lhcb/data/run.dst": {
                "replicas": [{"url": "root://eos.example.org//lhcb/data/run.dst", "se": "CERN-DST"}]
            }
        });
        let mut catalog = ReplicaCatalog::from_json_str(&existing.to_string(), "test").unwrap();
        let xml = r#"<POOLFILECATALOG>
  <File>
    <physical><pfn name="run.dst"/></physical>
    <logical><lfn name="/lhcb/data/run.dst"/></logical>
  </File>
</POOLFILECATALOG>"#;

        let report = merge_pool_xml(&mut catalog, xml, dir.path()).unwrap();
        assert_eq!(report.overwritten, vec![lfn("/lhcb/data/run.dst")]);
        let entry = catalog.get(&lfn("/lhcb/data/run.dst")).unwrap();
        assert_eq!(entry.replicas().len(), 2);
        assert_eq!(entry.size_bytes(), Some(16));
    }

    #[test]
    fn test_size_skips_local_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("run.dst")).unwrap();
        fs::create_dir(dir.path().join("copy")).unwrap();
        fs::write(dir.path().join("copy").join("run.dst"), b"0123").unwrap();
        let xml = r#"<POOLFILECATALOG>
  <File>
    <physical>
      <pfn name="run.dst"/>
      <pfn name="copy/run.dst"/>
    </physical>
    <logical><lfn name="/lhcb/data/run.dst"/></logical>
  </File>
</POOLFILECATALOG>"#;

        let catalog = from_pool_xml(xml, ReplicaCatalog::new(), dir.path()).unwrap();
        let entry = catalog.get(&lfn("/lhcb/data/run.dst")).unwrap();
        assert_eq!(entry.size_bytes(), Some(4));
    }

    #[test]
    fn test_bare_path_replica_is_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("input.raw");
        fs::write(&file, b"raw").unwrap();
        let existing = json!({
            "/exp/input.raw": {
                "replicas": [{"url": file.to_str().unwrap(), "se": "SE1"}],
                "size_bytes": 3
            }
        });
        let mut catalog = ReplicaCatalog::from_json_str(&existing.to_string(), "test").unwrap();
        let before = catalog.clone();
        let xml = format!(
            r#"<POOLFILECATALOG>
  <File>
    <physical><pfn name="{}"/></physical>
    <logical><lfn name="/exp/input.raw"/></logical>
  </File>
</POOLFILECATALOG>"#,
            file.display()
        );

        let report = merge_pool_xml(&mut catalog, &xml, Path::new("/work")).unwrap();
        assert!(report.is_noop());
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_invalid_guid_leaves_catalog_untouched() {
        let xml = r#"<POOLFILECATALOG>
  <File ID="6F1C1E4A-3C2B-4F3A-9D7E-0123456789AB">
    <physical><pfn name="root://eos.example.org//a.dst"/></physical>
    <logical><lfn name="/a.dst"/></logical>
  </File>
  <File ID="not-a-guid">
    <physical><pfn name="root://eos.example.org//b.dst"/></physical>
    <logical><lfn name="/b.dst"/></logical>
  </File>
</POOLFILECATALOG>"#;
        let mut catalog = ReplicaCatalog::new();
        let err = merge_pool_xml(&mut catalog, xml, Path::new("/work")).unwrap_err();
        assert!(err.is_validation());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        for xml in [
            "<POOLFILECATALOG><File><physical><pfn name=\"a\"/>",
            "<POOLFILECATALOG><pfn name=\"root://x//a\"/></POOLFILECATALOG>",
            "<POOLFILECATALOG><File><physical><pfn/></physical></File></POOLFILECATALOG>",
            "<POOLFILECATALOG><File></File></POOLFILECATALOG>",
        ] {
            let err = from_pool_xml(xml, ReplicaCatalog::new(), Path::new("/work")).unwrap_err();
            assert!(
                matches!(err, CatalogError::PoolXml { .. }),
                "unexpected error for {}: {}",
                xml,
                err
            );
        }
    }
}
