//! The seam between a workflow engine and the catalog.
//!
//! An engine implements [`WorkflowDriver`] and [`StepJob`]; [`CatalogExecutor`] walks its jobs
//! and wraps each one in catalog preparation and merge. Jobs reach their files through the
//! [`PathResolutionStrategy`] they are handed, never through a patched global.
mod executor;
pub mod hooks;

pub use executor::{CatalogExecutor, RunSummary};

use crate::resolver::PathResolutionStrategy;
use crate::step::inputs::StepInputs;
use anyhow::Result;
use catalog_common::workdir::StepWorkDir;
use std::path::Path;

/// One command-line step, ready to run.
pub trait StepJob {
    fn name(&self) -> &str;

    fn inputs(&self) -> &StepInputs;

    /// The directory the step runs in and leaves its outputs in.
    fn workdir(&self) -> &Path;

    fn command(&self) -> Vec<String>;

    /// Runs `command`, which is `command()` as rewritten by the execution hooks. `inputs` are
    /// the job's inputs with size and checksum filled in from the catalog.
    fn run(
        &mut self,
        command: &[String],
        inputs: &StepInputs,
        fs: &dyn PathResolutionStrategy,
    ) -> Result<()>;
}

/// Yields the jobs of a workflow one at a time, in an order that respects its dependencies.
pub trait WorkflowDriver {
    type Job: StepJob;

    fn next_job(&mut self) -> Result<Option<Self::Job>>;
}

/// Customizes a step around its execution.
pub trait ExecutionHook {
    fn name(&self) -> &str;

    /// Called after the step catalog is written. Returns the command to run.
    fn pre_process(&self, command: Vec<String>, _workdir: &StepWorkDir) -> Result<Vec<String>> {
        Ok(command)
    }

    /// Called after the step ran, before its catalog is merged.
    fn post_process(&self, _workdir: &StepWorkDir) -> Result<()> {
        Ok(())
    }
}
