//! Structural checksum identity
//!
//! Descriptors are identified by a SHA-256 digest over a deterministic byte
//! stream. The stream layout is fixed:
//! - integers are little-endian
//! - strings are a `u32` little-endian byte length followed by UTF-8 bytes
//! - optional values are a presence byte (`0`/`1`) followed by the value
//! - collections are a `u32` length followed by each element in order
//!
//! Two values with equal checksums are treated as the same value by the
//! registry and the compilation caches.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Width of a checksum digest in bytes
pub const CHECKSUM_LEN: usize = 32;

/// Fixed-width, immutable digest of a value's structural content
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum([u8; CHECKSUM_LEN]);

impl Checksum {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; CHECKSUM_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; CHECKSUM_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compute the checksum of a single value
    pub fn of<T: AppendToChecksum + ?Sized>(value: &T) -> Self {
        let mut builder = ChecksumBuilder::new();
        value.append_to_checksum(&mut builder);
        builder.finalize()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

impl FromStr for Checksum {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != CHECKSUM_LEN * 2 || s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::InvalidChecksum(s.to_string()));
        }

        let mut bytes = [0u8; CHECKSUM_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CoreError::InvalidChecksum(format!("{}: {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental checksum accumulator
///
/// `finalize` consumes the builder, so a finalized builder can never be
/// appended to again.
pub struct ChecksumBuilder {
    hasher: Sha256,
}

impl ChecksumBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Append a single byte
    pub fn append_byte(&mut self, value: u8) -> &mut Self {
        self.hasher.update([value]);
        self
    }

    /// Append raw bytes, without a length prefix
    pub fn append_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.hasher.update(value);
        self
    }

    /// Append a little-endian `i32`
    pub fn append_i32(&mut self, value: i32) -> &mut Self {
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Append a little-endian `u32`
    pub fn append_u32(&mut self, value: u32) -> &mut Self {
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Append a bool as one byte
    pub fn append_bool(&mut self, value: bool) -> &mut Self {
        self.append_byte(u8::from(value))
    }

    /// Append a length-prefixed UTF-8 string
    pub fn append_str(&mut self, value: &str) -> &mut Self {
        self.append_len(value.len());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Append an optional string as a presence byte followed by the value
    pub fn append_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => {
                self.append_byte(1);
                self.append_str(value)
            }
            None => self.append_byte(0),
        }
    }

    /// Append an ordered collection element by element
    pub fn append_seq<T: AppendToChecksum>(&mut self, items: &[T]) -> &mut Self {
        self.append_len(items.len());
        for item in items {
            item.append_to_checksum(self);
        }
        self
    }

    /// Append an ordered list of strings
    pub fn append_str_seq(&mut self, items: &[String]) -> &mut Self {
        self.append_len(items.len());
        for item in items {
            self.append_str(item);
        }
        self
    }

    /// Close the builder and produce the digest
    pub fn finalize(self) -> Checksum {
        Checksum(self.hasher.finalize().into())
    }

    fn append_len(&mut self, len: usize) {
        // Lengths beyond u32 are not meaningful for descriptor content.
        self.append_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }
}

impl Default for ChecksumBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A value that can contribute its structural content to a checksum
pub trait AppendToChecksum {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder);
}

impl AppendToChecksum for str {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder.append_str(self);
    }
}

impl AppendToChecksum for String {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder.append_str(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_is_sha256_of_nothing() {
        let checksum = ChecksumBuilder::new().finalize();
        assert_eq!(
            checksum.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_integer_byte_order_is_little_endian() {
        let mut a = ChecksumBuilder::new();
        a.append_i32(1);
        let mut b = ChecksumBuilder::new();
        b.append_bytes(&[1, 0, 0, 0]);
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_string_boundaries_are_length_prefixed() {
        let mut a = ChecksumBuilder::new();
        a.append_str("ab").append_str("c");
        let mut b = ChecksumBuilder::new();
        b.append_str("a").append_str("bc");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_option_presence_is_distinct_from_empty() {
        let mut a = ChecksumBuilder::new();
        a.append_opt_str(None);
        let mut b = ChecksumBuilder::new();
        b.append_opt_str(Some(""));
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_hex_round_trip() {
        let checksum = Checksum::of("input");
        let hex = checksum.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(hex.parse::<Checksum>().unwrap(), checksum);
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!("abc".parse::<Checksum>().is_err());
        let upper = Checksum::of("x").to_hex().to_uppercase();
        assert!(upper.parse::<Checksum>().is_err());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let checksum = Checksum::of("div");
        let json = serde_json::to_string(&checksum).unwrap();
        assert_eq!(json, format!("\"{}\"", checksum.to_hex()));
        let back: Checksum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, checksum);
    }
}
