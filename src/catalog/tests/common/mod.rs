#![allow(dead_code)]

use anyhow::Result;
use replica_catalog::driver::{StepJob, WorkflowDriver};
use replica_catalog::resolver::PathResolutionStrategy;
use replica_catalog::step::inputs::StepInputs;
use replica_catalog::ReplicaCatalog;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub const INPUT_LFN: &str = "/exp/run1/input.raw";
pub const OUTPUT_LFN: &str = "/exp/run1/output.dst";

pub fn master_catalog_json() -> Value {
    json!({
        INPUT_LFN: {
            "replicas": [{"url": "file:///data/input.raw", "se": "SE1"}],
            "size_bytes": 1024
        }
    })
}

pub fn master_catalog() -> ReplicaCatalog {
    ReplicaCatalog::from_json_str(&master_catalog_json().to_string(), "master").unwrap()
}

pub fn file_input(reference: &str) -> Value {
    json!({"class": "File", "location": reference})
}

type Action =
    Box<dyn FnMut(&Path, &[String], &StepInputs, &dyn PathResolutionStrategy) -> Result<()>>;

/// A step whose execution is a closure over its work directory.
pub struct FakeJob {
    pub name: String,
    pub inputs: StepInputs,
    pub workdir: PathBuf,
    pub command: Vec<String>,
    action: Action,
}

impl FakeJob {
    pub fn new(
        name: &str,
        inputs: Value,
        workdir: &Path,
        action: impl FnMut(&Path, &[String], &StepInputs, &dyn PathResolutionStrategy) -> Result<()>
            + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            inputs: StepInputs::from_json(inputs).unwrap(),
            workdir: workdir.to_path_buf(),
            command: vec![name.to_string()],
            action: Box::new(action),
        }
    }
}

impl StepJob for FakeJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &StepInputs {
        &self.inputs
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self) -> Vec<String> {
        self.command.clone()
    }

    fn run(
        &mut self,
        command: &[String],
        inputs: &StepInputs,
        fs: &dyn PathResolutionStrategy,
    ) -> Result<()> {
        (self.action)(&self.workdir, command, inputs, fs)
    }
}

#[derive(Default)]
pub struct FakeDriver {
    jobs: VecDeque<FakeJob>,
}

impl FakeDriver {
    pub fn new(jobs: impl IntoIterator<Item = FakeJob>) -> Self {
        Self {
            jobs: jobs.into_iter().collect(),
        }
    }
}

impl WorkflowDriver for FakeDriver {
    type Job = FakeJob;

    fn next_job(&mut self) -> Result<Option<FakeJob>> {
        Ok(self.jobs.pop_front())
    }
}
