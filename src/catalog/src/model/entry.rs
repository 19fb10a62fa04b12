use crate::errors::ValidationError;
use crate::model::checksum::{Checksum, Guid};
use crate::model::pfn::PhysicalFileName;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt::{Display, Formatter};

/// Names the storage backend holding a replica, e.g. `CERN-DST-EOS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageElementId(String);

impl StorageElementId {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::new(
                "se",
                "Storage Element ID cannot be empty",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StorageElementId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<StorageElementId> for String {
    fn from(se: StorageElementId) -> Self {
        se.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub url: PhysicalFileName,
    #[serde(rename = "se")]
    pub storage_element: StorageElementId,
}

impl Replica {
    pub fn new(url: PhysicalFileName, storage_element: StorageElementId) -> Self {
        Self {
            url,
            storage_element,
        }
    }
}

/// Everything the catalog knows about one logical file.
///
/// Invariant: `replicas` is never empty. Fields are private so an entry can only be built
/// through validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogEntry", into = "RawCatalogEntry")]
pub struct CatalogEntry {
    replicas: Vec<Replica>,
    size_bytes: Option<u64>,
    checksum: Option<Checksum>,
}

impl CatalogEntry {
    pub fn new(
        replicas: Vec<Replica>,
        size_bytes: Option<u64>,
        checksum: Option<Checksum>,
    ) -> Result<Self, ValidationError> {
        if replicas.is_empty() {
            return Err(ValidationError::new(
                "replicas",
                "At least one replica is required",
            ));
        }
        Ok(Self {
            replicas,
            size_bytes,
            checksum,
        })
    }

    pub fn replicas(&self) -> &[Replica] {
        &self.replicas
    }

    /// The replica used for resolution. Always present.
    pub fn first_replica(&self) -> &Replica {
        &self.replicas[0]
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub fn guid(&self) -> Option<&Guid> {
        self.checksum.as_ref().and_then(|c| c.guid.as_ref())
    }

    /// Whether a replica at the same location is listed. A bare path and the `file` URL of the
    /// same path count as one location.
    pub fn has_replica(&self, url: &PhysicalFileName) -> bool {
        self.replicas.iter().any(|r| r.url.same_location(url))
    }

    /// Appends the replicas whose location is not yet listed, keeping the existing order.
    pub fn with_additional_replicas(mut self, replicas: impl IntoIterator<Item = Replica>) -> Self {
        for replica in replicas {
            if !self.has_replica(&replica.url) {
                self.replicas.push(replica);
            }
        }
        self
    }

    pub fn with_size_bytes(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_guid(mut self, guid: Guid) -> Self {
        let mut checksum = self.checksum.take().unwrap_or_default();
        checksum.guid = Some(guid);
        self.checksum = Some(checksum);
        self
    }
}

/// The on-disk form of a replica, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReplica {
    pub url: String,
    pub se: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChecksum {
    #[serde(default)]
    pub adler32: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
}

/// The on-disk form of a catalog entry, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCatalogEntry {
    pub replicas: Vec<RawReplica>,
    #[serde(default)]
    pub size_bytes: Option<Number>,
    #[serde(default)]
    pub checksum: Option<RawChecksum>,
}

impl TryFrom<RawCatalogEntry> for CatalogEntry {
    type Error = ValidationError;

    fn try_from(raw: RawCatalogEntry) -> Result<Self, Self::Error> {
        let replicas = raw
            .replicas
            .iter()
            .enumerate()
            .map(|(i, replica)| {
                let url = PhysicalFileName::new(&replica.url)
                    .map_err(|e| e.within(format!("replicas[{}]", i)))?;
                let se = StorageElementId::new(&replica.se)
                    .map_err(|e| e.within(format!("replicas[{}]", i)))?;
                Ok(Replica::new(url, se))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let size_bytes = match raw.size_bytes {
            None => None,
            Some(size) => match size.as_u64() {
                Some(size) => Some(size),
                None if size.as_i64().is_some() => {
                    return Err(ValidationError::new(
                        "size_bytes",
                        format!("Size in bytes cannot be negative: {}", size),
                    ))
                }
                None => {
                    return Err(ValidationError::new(
                        "size_bytes",
                        format!("Size in bytes must be an integer: {}", size),
                    ))
                }
            },
        };

        let checksum = raw
            .checksum
            .map(|c| Checksum::new(c.adler32.as_deref(), c.guid.as_deref()))
            .transpose()
            .map_err(|e| e.within("checksum"))?;

        CatalogEntry::new(replicas, size_bytes, checksum)
    }
}

impl From<CatalogEntry> for RawCatalogEntry {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            replicas: entry
                .replicas
                .into_iter()
                .map(|r| RawReplica {
                    url: r.url.into(),
                    se: r.storage_element.into(),
                })
                .collect(),
            size_bytes: entry.size_bytes.map(Number::from),
            checksum: entry.checksum.map(|c| RawChecksum {
                adler32: c.adler32.map(String::from),
                guid: c.guid.map(String::from),
            }),
        }
    }
}
