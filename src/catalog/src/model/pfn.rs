use crate::constants::{FILE_SCHEME, PFN_PREFIX};
use crate::errors::ValidationError;
use crate::model::lfn::strip_prefix_ignore_case;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use url::Url;

/// The location of one copy of a file: a URL (`file://`, `root://`, `https://`, ...) or a bare
/// path to an existing local file.
///
/// The validated string is kept verbatim so that catalogs round-trip byte for byte; equality
/// and ordering follow that string. The parsed URL drives classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhysicalFileName {
    value: String,
    url: Option<Url>,
}

impl PhysicalFileName {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let value = strip_prefix_ignore_case(value, PFN_PREFIX).unwrap_or(value);
        if value.is_empty() {
            return Err(ValidationError::new("url", "PFN cannot be empty"));
        }
        match Url::parse(value) {
            Ok(url) => Ok(Self {
                value: value.to_string(),
                url: Some(url),
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                if Path::new(value).is_file() {
                    Ok(Self {
                        value: value.to_string(),
                        url: None,
                    })
                } else {
                    Err(ValidationError::new(
                        "url",
                        format!("PFN is neither a URL nor an existing local file: {}", value),
                    ))
                }
            }
            Err(e) => Err(ValidationError::new(
                "url",
                format!("PFN is not a valid URL ({}): {}", e, value),
            )),
        }
    }

    /// Builds a `file://` PFN for a local path. Relative paths are made absolute against the
    /// current directory.
    pub fn from_local_path(path: &Path) -> Result<Self, ValidationError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ValidationError::new("url", e.to_string()))?
                .join(path)
        };
        let url = Url::from_file_path(&absolute).map_err(|()| {
            ValidationError::new(
                "url",
                format!("cannot build a file URL for {}", absolute.display()),
            )
        })?;
        Ok(Self {
            value: url.to_string(),
            url: Some(url),
        })
    }

    /// Parses a PFN written by an external application. Bare paths need not exist yet; they
    /// become `file://` URLs, relative ones resolved against `base_dir`.
    pub fn from_external(value: &str, base_dir: &Path) -> Result<Self, ValidationError> {
        let value = value.trim();
        let value = strip_prefix_ignore_case(value, PFN_PREFIX).unwrap_or(value);
        match Url::parse(value) {
            Err(url::ParseError::RelativeUrlWithoutBase) if !value.is_empty() => {
                Self::from_local_path(&base_dir.join(value))
            }
            _ => Self::new(value),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The lowercase URL scheme, or `None` for a bare local path.
    pub fn scheme(&self) -> Option<&str> {
        self.url.as_ref().map(Url::scheme)
    }

    pub fn is_remote(&self) -> bool {
        self.local_path().is_none()
    }

    /// The local filesystem path of a `file` URL or a bare path; `None` for remote URLs and
    /// for `file` URLs naming another host.
    pub fn local_path(&self) -> Option<PathBuf> {
        match &self.url {
            None => Some(PathBuf::from(&self.value)),
            Some(url) if url.scheme().eq_ignore_ascii_case(FILE_SCHEME) => url.to_file_path().ok(),
            Some(_) => None,
        }
    }

    /// Whether both PFNs name the same file: the same text, or the same local path however
    /// it is spelled (`/data/a.raw`, `file:///data/a.raw`, `file:/data/a.raw`).
    pub fn same_location(&self, other: &Self) -> bool {
        if self.value == other.value {
            return true;
        }
        match (self.local_path(), other.local_path()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for PhysicalFileName {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for PhysicalFileName {}

impl Hash for PhysicalFileName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for PhysicalFileName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PhysicalFileName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Display for PhysicalFileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for PhysicalFileName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PhysicalFileName> for String {
    fn from(pfn: PhysicalFileName) -> Self {
        pfn.value
    }
}
