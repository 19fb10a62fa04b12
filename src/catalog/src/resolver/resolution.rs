use crate::model::{strip_logical_prefix, LogicalFileName, ReplicaCatalog};
use tracing::debug;

/// The outcome of turning a reference into something a step can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reference carries no logical prefix and is used unchanged.
    NotLogical(String),
    /// A logical reference whose LFN is not in the catalog. The value is the bare LFN, which
    /// is a best-effort fallback and not a usable location.
    Unresolved(String),
    /// The first replica is local; the value is its filesystem path.
    Local(String),
    /// The first replica is remote; the value is its URL.
    Remote(String),
}

impl Resolution {
    pub fn value(&self) -> &str {
        match self {
            Self::NotLogical(value)
            | Self::Unresolved(value)
            | Self::Local(value)
            | Self::Remote(value) => value,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn is_logical(&self) -> bool {
        !matches!(self, Self::NotLogical(_))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Local(_) | Self::Remote(_))
    }

    /// The `(value, is_remote)` pair handed to the filesystem layer.
    pub fn into_parts(self) -> (String, bool) {
        let is_remote = self.is_remote();
        let value = match self {
            Self::NotLogical(value)
            | Self::Unresolved(value)
            | Self::Local(value)
            | Self::Remote(value) => value,
        };
        (value, is_remote)
    }
}

/// Resolves `reference` against `catalog`.
///
/// Only the first replica of an entry is ever considered. `file` URLs resolve to their
/// path; bare local paths resolve to themselves; any other scheme is remote and returned as is.
/// Remote replicas are never probed. The prefix is stripped once, so `LFN:LFN:/a` is not `/a`.
pub fn resolve(reference: &str, catalog: &ReplicaCatalog) -> Resolution {
    let Some(bare) = strip_logical_prefix(reference) else {
        return Resolution::NotLogical(reference.to_string());
    };
    let Some((lfn, entry)) = LogicalFileName::new(reference)
        .ok()
        .and_then(|lfn| catalog.get(&lfn).map(|entry| (lfn, entry)))
    else {
        debug!("LFN {} is not in the replica catalog", bare);
        return Resolution::Unresolved(bare.to_string());
    };

    let url = &entry.first_replica().url;
    let resolution = match url.local_path() {
        Some(path) => Resolution::Local(path.to_string_lossy().into_owned()),
        None => Resolution::Remote(url.as_str().to_string()),
    };
    debug!("Resolved LFN:{} -> {}", lfn, url);
    resolution
}
