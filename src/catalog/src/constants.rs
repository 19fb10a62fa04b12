pub use catalog_common::workdir::{POOL_CATALOG_FILE, STEP_CATALOG_FILE};

pub const LFN_PREFIX: &str = "LFN:";
pub const PFN_PREFIX: &str = "PFN:";
pub const FILE_SCHEME: &str = "file";

/// Storage element recorded for replicas discovered in a step's working directory.
pub const LOCAL_STORAGE_ELEMENT: &str = "LocalDisk";
/// Storage element recorded for remote replicas learned from a pool XML catalog, which carries
/// no storage element of its own.
pub const UNKNOWN_STORAGE_ELEMENT: &str = "Unknown";

pub const ADLER32_CWL_PREFIX: &str = "adler32$";
pub const POOL_CATALOG_OPTION: &str = "--pool-xml-catalog";

pub const CONFIG_ENV_PREFIX: &str = "REPLICA_CATALOG";
pub const LOG_FILE: &str = "replica-catalog.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_OUTPUT_LFN_BASE: &str = "/";
