use crate::errors::{CatalogError, Result};
use crate::model::{LogicalFileName, MergeReport, ReplicaCatalog};
use crate::resolver::CatalogFsAccess;
use crate::step::inputs::StepInputs;
use catalog_common::workdir::StepWorkDir;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    Preparing,
    Running,
    Merging,
}

impl Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Running => "running",
            Self::Merging => "merging",
        };
        f.write_str(phase)
    }
}

/// What `prepare` did for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// Referenced LFNs that were copied into the step catalog.
    pub found: Vec<LogicalFileName>,
    /// Referenced LFNs absent from the master catalog.
    pub missing: Vec<LogicalFileName>,
    /// Where the step catalog was written; `None` when the work directory does not exist.
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug)]
struct ActiveStep {
    name: String,
    workdir: StepWorkDir,
}

/// Owns the master catalog of a run and scopes it to one step at a time.
///
/// Steps go through `Idle -> Preparing -> Running -> Merging -> Idle`. The master catalog is
/// only changed by `merge`.
#[derive(Debug)]
pub struct StepCatalogManager {
    master: ReplicaCatalog,
    phase: StepPhase,
    active: Option<ActiveStep>,
}

impl StepCatalogManager {
    pub fn new(master: ReplicaCatalog) -> Self {
        Self {
            master,
            phase: StepPhase::Idle,
            active: None,
        }
    }

    /// Loads the master catalog from `path`. No path, or a path that does not exist yet,
    /// starts the run from an empty catalog.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        let master = match path {
            None => ReplicaCatalog::new(),
            Some(path) => ReplicaCatalog::load_optional(path)?.unwrap_or_else(|| {
                info!("Master catalog {:?} does not exist yet, starting empty", path);
                ReplicaCatalog::new()
            }),
        };
        Ok(Self::new(master))
    }

    pub fn master(&self) -> &ReplicaCatalog {
        &self.master
    }

    pub fn into_master(self) -> ReplicaCatalog {
        self.master
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn current_step(&self) -> Option<&str> {
        self.active.as_ref().map(|step| step.name.as_str())
    }

    /// Filesystem access for a step, backed by the master catalog.
    pub fn fs_access(&self, basedir: impl Into<PathBuf>) -> CatalogFsAccess<'_> {
        CatalogFsAccess::new(basedir, &self.master)
    }

    fn transition(&mut self, phase: StepPhase) {
        debug!("Step catalog manager: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.active {
            Some(step) => Err(CatalogError::StepInProgress(step.name.clone())),
            None => Ok(()),
        }
    }

    /// Writes the step catalog for `step` into its work directory, holding only the master
    /// entries its inputs reference.
    pub fn prepare(
        &mut self,
        step: &str,
        inputs: &StepInputs,
        workdir: &StepWorkDir,
    ) -> Result<PrepareReport> {
        self.ensure_idle()?;
        self.transition(StepPhase::Preparing);
        match self.write_step_catalog(step, inputs, workdir) {
            Ok(report) => {
                self.active = Some(ActiveStep {
                    name: step.to_string(),
                    workdir: workdir.clone(),
                });
                self.transition(StepPhase::Running);
                Ok(report)
            }
            Err(e) => {
                self.transition(StepPhase::Idle);
                Err(e)
            }
        }
    }

    fn write_step_catalog(
        &self,
        step: &str,
        inputs: &StepInputs,
        workdir: &StepWorkDir,
    ) -> Result<PrepareReport> {
        let lfns = inputs.logical_files();
        let (catalog, missing) = self.master.subset(&lfns);
        for lfn in &missing {
            warn!("LFN {} used by step {} is not in the master catalog", lfn, step);
        }
        let found: Vec<_> = catalog.lfns().cloned().collect();

        if !workdir.exists() {
            warn!(
                "Work directory {:?} of step {} does not exist, not writing a step catalog",
                workdir.as_path(),
                step
            );
            return Ok(PrepareReport {
                found,
                missing,
                catalog_path: None,
            });
        }

        catalog.save(&workdir.catalog_file)?;
        info!(
            "Prepared step catalog for {} with {} of {} referenced LFNs",
            step,
            found.len(),
            lfns.len()
        );
        Ok(PrepareReport {
            found,
            missing,
            catalog_path: Some(workdir.catalog_file.clone()),
        })
    }

    /// Merges the catalog the running step left in its work directory into the master catalog
    /// and returns to `Idle`, whatever the outcome.
    pub fn merge(&mut self) -> Result<MergeReport> {
        let step = self.active.take().ok_or(CatalogError::NoStepInProgress)?;
        self.transition(StepPhase::Merging);
        let result = self.merge_workdir(&step.name, &step.workdir);
        self.transition(StepPhase::Idle);
        result
    }

    /// Merges a step catalog that was prepared outside this manager, for instance by an
    /// earlier process. Only allowed while no step is in progress.
    pub fn merge_external(&mut self, workdir: &StepWorkDir) -> Result<MergeReport> {
        self.ensure_idle()?;
        self.transition(StepPhase::Merging);
        let result = self.merge_workdir(&workdir.as_path().display().to_string(), workdir);
        self.transition(StepPhase::Idle);
        result
    }

    fn merge_workdir(&mut self, step: &str, workdir: &StepWorkDir) -> Result<MergeReport> {
        if !workdir.exists() {
            warn!(
                "Work directory {:?} of step {} does not exist, nothing to merge",
                workdir.as_path(),
                step
            );
            return Ok(MergeReport::default());
        }
        let Some(catalog) = ReplicaCatalog::load_optional(&workdir.catalog_file)? else {
            debug!("Step {} left no catalog behind, nothing to merge", step);
            return Ok(MergeReport::default());
        };
        let report = self.master.merge(&catalog);
        info!(
            "Merged step catalog of {}: {} inserted, {} overwritten, {} unchanged",
            step,
            report.inserted.len(),
            report.overwritten.len(),
            report.unchanged.len()
        );
        Ok(report)
    }

    /// Abandons the running step without merging its catalog.
    pub fn cancel(&mut self) -> Result<()> {
        let step = self.active.take().ok_or(CatalogError::NoStepInProgress)?;
        info!("Cancelled step {}, its catalog will not be merged", step.name);
        self.transition(StepPhase::Idle);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.master.save(path)?;
        info!("Saved master catalog ({} entries) to {:?}", self.master.len(), path);
        Ok(())
    }
}
