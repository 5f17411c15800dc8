//! Ciphertext handles
//!
//! A `Handle` is the 32-byte identifier of a ciphertext held by the
//! coprocessor. The last byte carries the encrypted type tag so a handle
//! can be type-checked without resolving it.
//!
//! `ConfidentialAmount` and `EncryptedBool` are typed views over a handle.
//! Neither exposes a plaintext; the only way back to a number is the
//! decryption gateway, which checks the ACL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Encrypted value types understood by the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FheType {
    Bool,
    Uint64,
}

impl FheType {
    pub(crate) const fn tag(self) -> u8 {
        match self {
            FheType::Bool => 0x00,
            FheType::Uint64 => 0x05,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(FheType::Bool),
            0x05 => Some(FheType::Uint64),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FheType::Bool => "ebool",
            FheType::Uint64 => "euint64",
        }
    }
}

/// Opaque ciphertext identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle([u8; 32]);

impl Handle {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Type tag embedded in the handle
    pub fn fhe_type(&self) -> Option<FheType> {
        FheType::from_tag(self.0[31])
    }

    /// Build a handle from a digest, stamping the type tag into the last byte
    pub(crate) fn tagged(mut digest: [u8; 32], ty: FheType) -> Self {
        digest[31] = ty.tag();
        Self(digest)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // abbreviated, full value via Display
        write!(f, "Handle(0x{}..)", hex::encode(&self.0[..6]))
    }
}

/// Handle parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle {0:?}: expected 0x followed by 64 hex digits")]
pub struct HandleParseError(pub String);

impl FromStr for Handle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| HandleParseError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.to_string()
    }
}

/// Encrypted unsigned 64-bit amount
///
/// Immutable: every arithmetic operation on it yields a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidentialAmount {
    handle: Handle,
}

impl ConfidentialAmount {
    /// Wrap a handle produced by an executor. Executor implementations are
    /// responsible for only wrapping `euint64` handles.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }
}

/// Encrypted boolean (result of a comparison)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBool {
    handle: Handle,
}

impl EncryptedBool {
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }
}
