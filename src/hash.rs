// src/hash.rs

//! Content hashing for package.xml file entries
//!
//! The Magento installer verifies every file against the MD5 digest recorded
//! in `package.xml`, so MD5 is the only algorithm the descriptor carries.
//! Digests are always rendered as 32 lowercase hex characters.

use md5::{Digest, Md5};
use std::fmt;

/// Length of an MD5 digest rendered as hex
pub const MD5_HEX_LEN: usize = 32;

/// Hash parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Hash string has wrong length
    InvalidLength { expected: usize, got: usize },
    /// Hash string contains invalid hex characters
    InvalidHex(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid hash length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in hash: {}", s),
        }
    }
}

impl std::error::Error for HashError {}

/// A validated MD5 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a hex digest, normalizing it to lowercase
    pub fn parse(value: &str) -> Result<Self, HashError> {
        if value.len() != MD5_HEX_LEN {
            return Err(HashError::InvalidLength {
                expected: MD5_HEX_LEN,
                got: value.len(),
            });
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex(value.to_string()));
        }

        Ok(Self(value.to_lowercase()))
    }

    /// Get the digest as a hex string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the hex string
    pub fn into_string(self) -> String {
        self.0
    }

    /// Compare against a recorded digest, ignoring hex case
    ///
    /// # Example
    /// ```
    /// use magepkg::hash::ContentHash;
    ///
    /// let hash = ContentHash::parse("9dd4e461268c8034f5c8564e155c67a6").unwrap();
    /// assert!(hash.verify("9DD4E461268C8034F5C8564E155C67A6").is_ok());
    /// assert!(hash.verify("d41d8cd98f00b204e9800998ecf8427e").is_err());
    /// ```
    pub fn verify(&self, expected: &str) -> Result<(), VerifyError> {
        if self.0.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(VerifyError {
                expected: expected.to_string(),
                actual: self.0.clone(),
            })
        }
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental MD5 hasher
#[derive(Default)]
pub struct Hasher {
    state: Md5,
}

impl Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalize and return the digest
    pub fn finalize(self) -> ContentHash {
        ContentHash(hex::encode(self.state.finalize()))
    }
}

/// Compute the MD5 digest of a byte slice
pub fn md5_hash(data: &[u8]) -> ContentHash {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// MD5 of a byte slice as lowercase hex
pub fn md5(data: &[u8]) -> String {
    md5_hash(data).into_string()
}

/// Verification result error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "md5 mismatch: expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for VerifyError {}
