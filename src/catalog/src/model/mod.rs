//! Validated catalog types: logical and physical file names, checksums, entries and the
//! catalog mapping itself.
//!
//! Everything read from outside the process (catalog files, pool XML, workflow inputs) goes
//! through these constructors, so an invalid value never reaches the resolver or the merge.
mod catalog;
mod checksum;
mod entry;
mod lfn;
mod pfn;

pub use catalog::{MergeOutcome, MergeReport, ReplicaCatalog};
pub use checksum::{Adler32, Checksum, Guid};
pub use entry::{CatalogEntry, RawCatalogEntry, RawChecksum, RawReplica, Replica, StorageElementId};
pub use lfn::{is_logical_reference, normalize, strip_logical_prefix, LogicalFileName};
pub use pfn::PhysicalFileName;
