use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a `SignalConfig` (hex-encoded BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content hash of the price and breadth inputs (hex-encoded BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hasher(hasher: &blake3::Hasher) -> Self {
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex chars, enough to tell runs apart in a terminal.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_hash_is_deterministic() {
        let a = ConfigHash::from_bytes(b"strategic_entry_breadth=16");
        let b = ConfigHash::from_bytes(b"strategic_entry_breadth=16");
        let c = ConfigHash::from_bytes(b"strategic_entry_breadth=15");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn dataset_hash_short_prefix() {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"2025-01-02");
        let h = DatasetHash::from_hasher(&hasher);
        assert_eq!(h.short().len(), 12);
        assert!(h.0.starts_with(h.short()));
    }
}
