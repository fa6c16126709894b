//! Canonical content reference (cast hash)
//!
//! On-chain the cast hash travels as `bytes32` with the 20-byte hash left-aligned.
//! Storage and every lookup use the truncated 20-byte form: `0x` followed by 40
//! lowercase hex characters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of significant bytes in a cast hash
pub const CONTENT_REF_BYTES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRefError {
    InvalidHex(String),
    InvalidLength(usize),
}

impl fmt::Display for ContentRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRefError::InvalidHex(input) => write!(f, "Invalid hex in content reference: {}", input),
            ContentRefError::InvalidLength(len) => write!(
                f,
                "Content reference must be 20 or 32 bytes, got {} hex characters",
                len
            ),
        }
    }
}

impl std::error::Error for ContentRefError {}

/// A cast hash in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Normalize a 20- or 32-byte hex string, with or without `0x`, in any case
    pub fn normalize(input: &str) -> Result<Self, ContentRefError> {
        let trimmed = input.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex_part.len() != CONTENT_REF_BYTES * 2 && hex_part.len() != 64 {
            return Err(ContentRefError::InvalidLength(hex_part.len()));
        }

        let bytes =
            hex::decode(hex_part).map_err(|_| ContentRefError::InvalidHex(input.to_string()))?;

        Ok(Self::from_slice(&bytes[..CONTENT_REF_BYTES]))
    }

    /// Build from the on-chain `bytes32` representation
    pub fn from_bytes32(bytes: &[u8; 32]) -> Self {
        Self::from_slice(&bytes[..CONTENT_REF_BYTES])
    }

    fn from_slice(bytes: &[u8]) -> Self {
        ContentRef(format!("0x{}", hex::encode(bytes)))
    }

    /// Left-aligned `bytes32` form expected by the auction contract
    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // The canonical form is always valid hex of the right width
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out[..CONTENT_REF_BYTES].copy_from_slice(&bytes);
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
