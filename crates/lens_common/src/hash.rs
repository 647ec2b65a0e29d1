//! Content hashing for translation-unit cache keys and change detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 64-bit content hash computed using XXH3.
///
/// Two buffers with the same `ContentHash` are assumed to have identical content.
/// Used as the reparse trigger for cached translation units, as the identity of
/// argument sets and header snapshots, and as the fingerprint of diagnostic sets.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(u64);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-64.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(data))
    }

    /// Computes a content hash of a UTF-8 string.
    pub fn of_str(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the raw 64-bit value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", self.0 >> 32)
    }
}

/// Incremental hasher for composite keys.
///
/// Fields are separated by a zero byte so that `("ab", "c")` and `("a", "bc")`
/// hash differently.
pub struct HashBuilder {
    state: Xxh3,
}

impl HashBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds a string field.
    pub fn str(mut self, field: &str) -> Self {
        self.state.update(field.as_bytes());
        self.state.update(&[0]);
        self
    }

    /// Feeds raw bytes without a separator.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.state.update(data);
        self
    }

    /// Feeds an integer in little-endian form.
    pub fn u64(mut self, value: u64) -> Self {
        self.state.update(&value.to_le_bytes());
        self
    }

    /// Feeds a previously computed hash.
    pub fn hash(self, value: ContentHash) -> Self {
        self.u64(value.0)
    }

    /// Finishes the computation.
    pub fn finish(self) -> ContentHash {
        ContentHash(self.state.digest())
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"void setup(){}");
        let b = ContentHash::from_bytes(b"void setup(){}");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::of_str("setup");
        let b = ContentHash::of_str("loop");
        assert_ne!(a, b);
    }

    #[test]
    fn display_format() {
        let h = ContentHash::of_str("test");
        let s = format!("{h}");
        assert_eq!(s.len(), 16, "Display should be 16 hex chars");
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::of_str("test"));
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn builder_separates_fields() {
        let a = HashBuilder::new().str("ab").str("c").finish();
        let b = HashBuilder::new().str("a").str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn builder_is_deterministic() {
        let h = ContentHash::of_str("x");
        let a = HashBuilder::new().str("-DARDUINO").hash(h).u64(7).finish();
        let b = HashBuilder::new().str("-DARDUINO").hash(h).u64(7).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::of_str("serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
