use crate::errors::{CatalogError, Result, ValidationError};
use crate::model::{is_logical_reference, LogicalFileName, ReplicaCatalog};
use crate::resolver::glob::glob;
use crate::resolver::resolution::{resolve, Resolution};
use crate::resolver::PathResolutionStrategy;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Where a reference points once resolved.
enum Target {
    Local(PathBuf),
    Remote(String),
}

/// Filesystem access for a step that understands logical references.
///
/// Plain paths behave like ordinary filesystem paths relative to `basedir`. Logical
/// references are resolved through the catalog first; remote replicas are assumed to exist and
/// to be files, since they cannot be probed without a network round trip.
#[derive(Debug, Clone)]
pub struct CatalogFsAccess<'a> {
    basedir: PathBuf,
    catalog: &'a ReplicaCatalog,
}

impl<'a> CatalogFsAccess<'a> {
    pub fn new(basedir: impl Into<PathBuf>, catalog: &'a ReplicaCatalog) -> Self {
        Self {
            basedir: basedir.into(),
            catalog,
        }
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    pub fn catalog(&self) -> &ReplicaCatalog {
        self.catalog
    }

    fn abs(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.basedir.join(path)
        }
    }

    /// The local path behind a reference, or the remote URL when it resolves remotely.
    /// A malformed logical reference is an error rather than a path under `basedir`.
    fn locate(&self, reference: &str) -> Result<Target> {
        match resolve(reference, self.catalog) {
            Resolution::Remote(url) => Ok(Target::Remote(url)),
            Resolution::Unresolved(_) => {
                let lfn = LogicalFileName::new(reference)?;
                Ok(Target::Local(PathBuf::from(lfn.as_str())))
            }
            resolution => Ok(Target::Local(self.abs(resolution.value()))),
        }
    }
}

impl PathResolutionStrategy for CatalogFsAccess<'_> {
    fn resolve(&self, reference: &str) -> Resolution {
        resolve(reference, self.catalog)
    }

    fn exists(&self, reference: &str) -> bool {
        match self.locate(reference) {
            Ok(Target::Local(path)) => path.exists(),
            Ok(Target::Remote(_)) => true,
            Err(_) => false,
        }
    }

    fn is_file(&self, reference: &str) -> bool {
        match self.locate(reference) {
            Ok(Target::Local(path)) => path.is_file(),
            Ok(Target::Remote(_)) => true,
            Err(_) => false,
        }
    }

    fn is_directory(&self, reference: &str) -> bool {
        if is_logical_reference(reference) {
            return false;
        }
        self.abs(reference).is_dir()
    }

    fn size(&self, reference: &str) -> Result<u64> {
        if is_logical_reference(reference) {
            if let Some(size) = self
                .catalog
                .lookup(reference)
                .and_then(|(_, entry)| entry.size_bytes())
            {
                return Ok(size);
            }
        }
        match self.locate(reference)? {
            Target::Local(path) => std::fs::metadata(&path)
                .map(|metadata| metadata.len())
                .map_err(|e| CatalogError::io(&path, e)),
            Target::Remote(url) => Err(CatalogError::RemoteAccess {
                operation: "determine size of remote file",
                url,
            }),
        }
    }

    fn open(&self, reference: &str) -> Result<File> {
        match self.locate(reference)? {
            Target::Local(path) => File::open(&path).map_err(|e| CatalogError::io(&path, e)),
            Target::Remote(url) => Err(CatalogError::RemoteAccess {
                operation: "open remote file",
                url,
            }),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        if is_logical_reference(pattern) {
            // an LFN names exactly one file, so it "matches" when it exists
            return Ok(if self.exists(pattern) {
                vec![pattern.to_string()]
            } else {
                Vec::new()
            });
        }
        let pattern = self.abs(pattern);
        let matches = glob(&pattern.to_string_lossy())
            .map_err(|e| ValidationError::new("pattern", e.to_string()))?;
        Ok(matches
            .into_iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }
}
