pub mod inputs;
mod manager;

pub use manager::{PrepareReport, StepCatalogManager, StepPhase};
