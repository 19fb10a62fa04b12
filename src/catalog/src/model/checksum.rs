use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// An Adler-32 checksum in its canonical form: 8 lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Adler32(String);

impl Adler32 {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let value = value.to_lowercase();
        if value.len() != 8 {
            return Err(ValidationError::new(
                "adler32",
                format!(
                    "Adler32 checksum must be 8 characters long, got {}: {}",
                    value.len(),
                    value
                ),
            ));
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::new(
                "adler32",
                format!(
                    "Adler32 checksum must contain only hexadecimal characters: {}",
                    value
                ),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file GUID in canonical 8-4-4-4-12 uppercase form, e.g. `6032CB7C-32DC-EC11-9A66-D85ED3091D71`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Guid(String);

impl Guid {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let value = value.to_uppercase();
        if value.len() != 36 {
            return Err(ValidationError::new(
                "guid",
                format!(
                    "GUID must be 36 characters long (including hyphens), got {}: {}",
                    value.len(),
                    value
                ),
            ));
        }
        let groups: Vec<&str> = value.split('-').collect();
        let well_formed = groups.len() == Self::GROUPS.len()
            && groups
                .iter()
                .zip(Self::GROUPS)
                .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(ValidationError::new(
                "guid",
                format!("GUID must follow format 8-4-4-4-12 (UUID): {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// A fresh random GUID for a file the catalog has never seen.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_conversions {
    ($ty:ty) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

string_conversions!(Adler32);
string_conversions!(Guid);

/// Integrity information recorded for a catalog entry. Either part may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub adler32: Option<Adler32>,
    pub guid: Option<Guid>,
}

impl Checksum {
    pub fn new(adler32: Option<&str>, guid: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            adler32: adler32.map(Adler32::new).transpose()?,
            guid: guid.map(Guid::new).transpose()?,
        })
    }

    pub fn with_guid(guid: Guid) -> Self {
        Self {
            adler32: None,
            guid: Some(guid),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.adler32.is_none() && self.guid.is_none()
    }
}
