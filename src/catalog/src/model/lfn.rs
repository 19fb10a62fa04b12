use crate::constants::LFN_PREFIX;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strips `prefix` from the start of `value`, ignoring ASCII case.
pub(crate) fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&value[prefix.len()..]),
        _ => None,
    }
}

/// Returns the LFN part of a logical reference (`LFN:/a/b` or `lfn:/a/b`), or `None` when the
/// reference does not carry the logical prefix.
pub fn strip_logical_prefix(reference: &str) -> Option<&str> {
    strip_prefix_ignore_case(reference, LFN_PREFIX)
}

pub fn is_logical_reference(reference: &str) -> bool {
    strip_logical_prefix(reference).is_some()
}

/// Normalizes a possibly prefixed logical file name. The result never carries the prefix and
/// always starts with `/`, and normalizing it again returns it unchanged.
pub fn normalize(value: &str) -> Result<String, ValidationError> {
    let lfn = strip_logical_prefix(value).unwrap_or(value);
    if lfn.is_empty() {
        return Err(ValidationError::new("lfn", "LFN cannot be empty"));
    }
    if !lfn.starts_with('/') {
        return Err(ValidationError::new(
            "lfn",
            format!("LFN must start with '/': {}", lfn),
        ));
    }
    Ok(lfn.to_string())
}

/// A location independent file identifier such as
/// `/lhcb/MC/2024/HLT2.DST/00327923/0000/00327923_00000533_1.hlt2.dst`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalFileName(String);

impl LogicalFileName {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        normalize(value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefixed form used in workflow inputs, e.g. `LFN:/exp/run1/input.raw`.
    pub fn to_reference(&self) -> String {
        format!("{}{}", LFN_PREFIX, self.0)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// The text after the last `.` of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

impl Display for LogicalFileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LogicalFileName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogicalFileName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LogicalFileName> for String {
    fn from(lfn: LogicalFileName) -> Self {
        lfn.0
    }
}

impl AsRef<str> for LogicalFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/lhcb/MC/file.dst", "/lhcb/MC/file.dst")]
    #[case("LFN:/lhcb/MC/file.dst", "/lhcb/MC/file.dst")]
    #[case("lfn:/lhcb/MC/file.dst", "/lhcb/MC/file.dst")]
    #[case("Lfn:/lhcb/MC/file.dst", "/lhcb/MC/file.dst")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        let normalized = normalize(input).unwrap();
        assert_eq!(normalized, expected);
        assert_eq!(normalize(&normalized).unwrap(), normalized);
    }

    #[rstest]
    #[case::empty("")]
    #[case::prefix_only("LFN:")]
    #[case::relative("LFN:lhcb/file.dst")]
    #[case::double_prefix("LFN:LFN:/lhcb/file.dst")]
    fn test_normalize_rejects(#[case] input: &str) {
        let err = normalize(input).unwrap_err();
        assert_eq!(err.field, "lfn");
    }

    #[test]
    fn test_logical_prefix_detection() {
        assert_eq!(strip_logical_prefix("LFN:/a"), Some("/a"));
        assert_eq!(strip_logical_prefix("lfn:/a"), Some("/a"));
        assert_eq!(strip_logical_prefix("/a"), None);
        assert_eq!(strip_logical_prefix("LF"), None);
        assert!(!is_logical_reference("file:///a"));
    }

    #[test]
    fn test_file_name_and_extension() {
        let lfn = LogicalFileName::new("LFN:/exp/run1/00327923_1.hlt2.dst").unwrap();
        assert_eq!(lfn.file_name(), Some("00327923_1.hlt2.dst"));
        assert_eq!(lfn.extension(), Some("dst"));
        assert_eq!(lfn.to_reference(), "LFN:/exp/run1/00327923_1.hlt2.dst");

        let lfn = LogicalFileName::new("/exp/README").unwrap();
        assert_eq!(lfn.extension(), None);
    }

    #[test]
    fn test_serde_uses_bare_form() {
        let lfn: LogicalFileName = serde_json::from_str("\"LFN:/exp/a.raw\"").unwrap();
        assert_eq!(serde_json::to_string(&lfn).unwrap(), "\"/exp/a.raw\"");
        assert!(serde_json::from_str::<LogicalFileName>("\"exp/a.raw\"").is_err());
    }
}
