use super::{ExecutionHook, StepJob, WorkflowDriver};
use crate::config::Config;
use crate::resolver::annotate_inputs;
use crate::step::StepCatalogManager;
use anyhow::{Context, Result};
use catalog_common::workdir::StepWorkDir;
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub inserted: usize,
    pub overwritten: usize,
}

/// Runs the jobs of a workflow with catalog preparation before and merge after each one.
pub struct CatalogExecutor {
    manager: StepCatalogManager,
    master_path: Option<PathBuf>,
    step_catalog_file: String,
    pool_catalog_file: String,
    hooks: Vec<Box<dyn ExecutionHook>>,
}

impl CatalogExecutor {
    pub fn new(manager: StepCatalogManager, config: &Config) -> Self {
        Self {
            manager,
            master_path: config.master_catalog.clone(),
            step_catalog_file: config.step_catalog_file.clone(),
            pool_catalog_file: config.pool_catalog_file.clone(),
            hooks: Vec::new(),
        }
    }

    /// Loads the configured master catalog, or starts from an empty one.
    pub fn from_config(config: &Config) -> Result<Self> {
        let manager = StepCatalogManager::from_path(config.master_catalog.as_deref())
            .context("failed to load the master catalog")?;
        Ok(Self::new(manager, config))
    }

    pub fn with_hook(mut self, hook: impl ExecutionHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn manager(&self) -> &StepCatalogManager {
        &self.manager
    }

    /// Runs every job the driver yields, then saves the master catalog when it has a path.
    /// A failing job aborts the run; its step catalog is not merged.
    pub fn run<D: WorkflowDriver>(&mut self, driver: &mut D) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while let Some(mut job) = driver.next_job()? {
            let name = job.name().to_string();
            if let Err(e) = self.run_job(&mut job, &mut summary) {
                error!("Step {} failed: {:#}", name, e);
                if self.manager.current_step().is_some() {
                    self.manager.cancel()?;
                }
                return Err(e.context(format!("step {} failed", name)));
            }
            summary.steps += 1;
        }

        if let Some(path) = &self.master_path {
            self.manager.save(path)?;
        }
        info!(
            "Workflow finished: {} steps, {} entries added, {} updated",
            summary.steps, summary.inserted, summary.overwritten
        );
        Ok(summary)
    }

    fn run_job<J: StepJob>(&mut self, job: &mut J, summary: &mut RunSummary) -> Result<()> {
        let workdir = StepWorkDir::with_file_names(
            job.workdir(),
            &self.step_catalog_file,
            &self.pool_catalog_file,
        );
        self.manager.prepare(job.name(), job.inputs(), &workdir)?;

        let mut inputs = job.inputs().clone();
        let annotated = annotate_inputs(&mut inputs, self.manager.master());
        if annotated > 0 {
            debug!("Annotated {} input files of {} from the catalog", annotated, job.name());
        }

        let mut command = job.command();
        for hook in &self.hooks {
            command = hook
                .pre_process(command, &workdir)
                .with_context(|| format!("{} pre-processing failed", hook.name()))?;
        }

        let fs = self.manager.fs_access(workdir.as_path());
        job.run(&command, &inputs, &fs)?;

        for hook in &self.hooks {
            hook.post_process(&workdir)
                .with_context(|| format!("{} post-processing failed", hook.name()))?;
        }

        let report = self.manager.merge()?;
        summary.inserted += report.inserted.len();
        summary.overwritten += report.overwritten.len();
        Ok(())
    }
}
