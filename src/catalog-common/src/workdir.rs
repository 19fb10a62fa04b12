use std::path::{Path, PathBuf};

pub const STEP_CATALOG_FILE: &str = "replica_catalog.json";
pub const POOL_CATALOG_FILE: &str = "pool_xml_catalog.xml";

/// The catalog files a step finds in (and leaves behind in) its working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWorkDir {
    pub path: PathBuf,
    pub catalog_file: PathBuf,
    pub pool_catalog_file: PathBuf,
}

impl StepWorkDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_file_names(path, STEP_CATALOG_FILE, POOL_CATALOG_FILE)
    }

    pub fn with_file_names(
        path: impl Into<PathBuf>,
        catalog_file_name: &str,
        pool_catalog_file_name: &str,
    ) -> Self {
        let path = path.into();
        Self {
            catalog_file: path.join(catalog_file_name),
            pool_catalog_file: path.join(pool_catalog_file_name),
            path,
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog_file.is_file()
    }

    pub fn has_pool_catalog(&self) -> bool {
        self.pool_catalog_file.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::defaults(StepWorkDir::new("/work/step1"), "replica_catalog.json", "pool_xml_catalog.xml")]
    #[case::custom(
        StepWorkDir::with_file_names("/work/step1", "catalog.json", "pool.xml"),
        "catalog.json",
        "pool.xml"
    )]
    fn test_file_layout(#[case] workdir: StepWorkDir, #[case] catalog: &str, #[case] pool: &str) {
        assert_eq!(workdir.catalog_file, Path::new("/work/step1").join(catalog));
        assert_eq!(workdir.pool_catalog_file, Path::new("/work/step1").join(pool));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = StepWorkDir::new(dir.path().join("gone"));
        assert!(!workdir.exists());
        assert!(!workdir.has_catalog());
    }
}
