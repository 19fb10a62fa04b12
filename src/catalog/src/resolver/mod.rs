//! Resolution of logical references for the steps of a workflow.
mod annotate;
mod fs_access;
mod glob;
mod resolution;

pub use annotate::{annotate_file, annotate_inputs};
pub use fs_access::CatalogFsAccess;
pub use glob::glob;
pub use resolution::{resolve, Resolution};

use crate::errors::Result;
use std::fs::File;

/// How a workflow engine reaches the files a step references.
///
/// The engine hands every path-like value to the strategy instead of touching the
/// filesystem itself, so logical references can be mapped to replicas.
pub trait PathResolutionStrategy {
    fn resolve(&self, reference: &str) -> Resolution;

    fn exists(&self, reference: &str) -> bool;

    fn is_file(&self, reference: &str) -> bool;

    fn is_directory(&self, reference: &str) -> bool;

    /// Size in bytes. Fails for remote replicas whose size the catalog does not record.
    fn size(&self, reference: &str) -> Result<u64>;

    /// Opens a local file for reading. Remote replicas cannot be opened.
    fn open(&self, reference: &str) -> Result<File>;

    fn glob(&self, pattern: &str) -> Result<Vec<String>>;
}
