//! A replica catalog for step-by-step workflow execution.
//!
//! The master catalog maps logical file names to their replicas. Before a step runs it sees
//! only the entries its inputs reference; after it finishes, the entries it added or changed
//! are merged back. Applications that only read pool XML catalogs are served through
//! [`pool`].
pub mod cli;
pub mod config;
pub mod constants;
pub mod driver;
pub mod errors;
pub mod logging;
pub mod model;
pub mod pool;
pub mod resolver;
pub mod step;

pub use errors::{CatalogError, Result, ValidationError};
pub use model::{LogicalFileName, PhysicalFileName, ReplicaCatalog};
pub use step::StepCatalogManager;
