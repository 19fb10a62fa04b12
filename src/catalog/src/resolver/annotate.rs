use crate::constants::ADLER32_CWL_PREFIX;
use crate::step::inputs::{FileReference, StepInputs};
use crate::model::ReplicaCatalog;

/// Copies size and checksum from the catalog onto a logical file reference.
/// Values already present on the reference are kept. Returns whether anything changed.
pub fn annotate_file(file: &mut FileReference, catalog: &ReplicaCatalog) -> bool {
    let Some(entry) = file.lfn.as_ref().and_then(|lfn| catalog.get(lfn)) else {
        return false;
    };
    let mut changed = false;
    if file.size.is_none() {
        if let Some(size) = entry.size_bytes() {
            file.size = Some(size);
            changed = true;
        }
    }
    if file.checksum.is_none() {
        if let Some(adler32) = entry.checksum().and_then(|c| c.adler32.as_ref()) {
            file.checksum = Some(format!("{}{}", ADLER32_CWL_PREFIX, adler32));
            changed = true;
        }
    }
    changed
}

/// Annotates every file in `inputs`, secondary files included. Returns the number of files
/// that were changed.
pub fn annotate_inputs(inputs: &mut StepInputs, catalog: &ReplicaCatalog) -> usize {
    let mut annotated = 0;
    inputs.for_each_file_mut(|file| {
        if annotate_file(file, catalog) {
            annotated += 1;
        }
    });
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> ReplicaCatalog {
        let json = json!({
            "/exp/a.raw": {
                "replicas": [{"url": "root://eos.example.org//exp/a.raw", "se": "SE1"}],
                "size_bytes": 1024,
                "checksum": {"adler32": "788c5caa", "guid": null}
            },
            "/exp/a.raw.idx": {
                "replicas": [{"url": "root://eos.example.org//exp/a.raw.idx", "se": "SE1"}],
                "size_bytes": 16
            }
        });
        ReplicaCatalog::from_json_str(&json.to_string(), "test").unwrap()
    }

    #[test]
    fn test_annotate_inputs() {
        let mut inputs = StepInputs::from_json(json!({
            "data": {"class": "File", "location": "LFN:/exp/a.raw", "secondaryFiles": [
                {"class": "File", "location": "LFN:/exp/a.raw.idx"}
            ]},
            "local": {"class": "File", "location": "file:///tmp/x"}
        }))
        .unwrap();

        assert_eq!(annotate_inputs(&mut inputs, &catalog()), 2);
        assert_eq!(
            inputs.to_json(),
            json!({
                "data": {
                    "class": "File",
                    "location": "LFN:/exp/a.raw",
                    "size": 1024,
                    "checksum": "adler32$788c5caa",
                    "secondaryFiles": [
                        {"class": "File", "location": "LFN:/exp/a.raw.idx", "size": 16}
                    ]
                },
                "local": {"class": "File", "location": "file:///tmp/x"}
            })
        );
    }

    #[test]
    fn test_existing_values_are_kept() {
        let mut inputs = StepInputs::from_json(json!({
            "data": {"class": "File", "location": "LFN:/exp/a.raw", "size": 7, "checksum": "sha1$abc"}
        }))
        .unwrap();
        assert_eq!(annotate_inputs(&mut inputs, &catalog()), 0);
        assert_eq!(inputs.to_json()["data"]["size"], json!(7));
    }
}
