mod common;

use self::common::{file_input, master_catalog, INPUT_LFN, OUTPUT_LFN};
use catalog_common::workdir::StepWorkDir;
use pretty_assertions_sorted::assert_eq;
use replica_catalog::model::{CatalogEntry, PhysicalFileName, Replica, StorageElementId};
use replica_catalog::step::inputs::StepInputs;
use replica_catalog::{LogicalFileName, ReplicaCatalog, StepCatalogManager};
use serde_json::json;
use tempfile::TempDir;

fn lfn(value: &str) -> LogicalFileName {
    LogicalFileName::new(value).unwrap()
}

#[test]
fn test_step_adds_output_to_master_catalog() {
    let dir = TempDir::new().unwrap();
    let workdir = StepWorkDir::new(dir.path());
    let mut manager = StepCatalogManager::new(master_catalog());

    let inputs = StepInputs::from_json(json!({
        "input-data": [file_input(&format!("LFN:{}", INPUT_LFN))]
    }))
    .unwrap();
    let report = manager.prepare("step-a", &inputs, &workdir).unwrap();
    assert!(report.missing.is_empty());

    // the step catalog holds exactly the input entry
    let mut step_catalog = ReplicaCatalog::load(&workdir.catalog_file).unwrap();
    assert_eq!(step_catalog, master_catalog());

    // the step registers its output
    step_catalog.insert(
        lfn(OUTPUT_LFN),
        CatalogEntry::new(
            vec![Replica::new(
                PhysicalFileName::new("file:///work/step-a/output.dst").unwrap(),
                StorageElementId::new("LocalDisk").unwrap(),
            )],
            None,
            None,
        )
        .unwrap(),
    );
    step_catalog.save(&workdir.catalog_file).unwrap();

    let report = manager.merge().unwrap();
    assert_eq!(report.inserted, vec![lfn(OUTPUT_LFN)]);
    assert_eq!(report.unchanged, vec![lfn(INPUT_LFN)]);

    let master = manager.master();
    assert_eq!(master.len(), 2);
    assert_eq!(master.get(&lfn(INPUT_LFN)), master_catalog().get(&lfn(INPUT_LFN)));
    assert_eq!(
        master.get(&lfn(OUTPUT_LFN)).unwrap().first_replica().url.as_str(),
        "file:///work/step-a/output.dst"
    );
}

#[test]
fn test_second_step_sees_first_step_output() {
    let dir = TempDir::new().unwrap();
    let step_a = StepWorkDir::new(dir.path().join("a"));
    let step_b = StepWorkDir::new(dir.path().join("b"));
    std::fs::create_dir_all(step_a.as_path()).unwrap();
    std::fs::create_dir_all(step_b.as_path()).unwrap();
    let mut manager = StepCatalogManager::new(master_catalog());

    manager.prepare("a", &StepInputs::new(), &step_a).unwrap();
    std::fs::write(
        &step_a.catalog_file,
        json!({OUTPUT_LFN: {"replicas": [
            {"url": "root://eos.example.org//exp/run1/output.dst", "se": "EOS"}
        ]}})
        .to_string(),
    )
    .unwrap();
    manager.merge().unwrap();

    let inputs =
        StepInputs::from_json(json!({"data": file_input(&format!("lfn:{}", OUTPUT_LFN))}))
            .unwrap();
    let report = manager.prepare("b", &inputs, &step_b).unwrap();
    assert_eq!(report.found, vec![lfn(OUTPUT_LFN)]);

    let fs = manager.fs_access(step_b.as_path());
    let reference = format!("LFN:{}", OUTPUT_LFN);
    assert_eq!(
        replica_catalog::resolver::resolve(&reference, fs.catalog()).into_parts(),
        ("root://eos.example.org//exp/run1/output.dst".to_string(), true)
    );
}

#[test]
fn test_unresolved_lfn_passes_through() {
    let resolution =
        replica_catalog::resolver::resolve("LFN:/not/in/catalog", &ReplicaCatalog::new());
    assert!(!resolution.is_resolved());
    assert_eq!(resolution.into_parts(), ("/not/in/catalog".to_string(), false));
}
