use serde::{Deserialize, Serialize};

/// Cadastral parcel identifier as scraped from the mapping page.
///
/// The key is opaque to this system: the lookup service owns its structure.
/// Construction only normalizes whitespace and rejects empty results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelKey(String);

impl ParcelKey {
    /// Collapse whitespace runs to single spaces and trim both ends.
    /// Returns `None` when nothing but whitespace remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParcelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
