//! Encrypted-arithmetic building blocks
//!
//! - `Handle`, `ConfidentialAmount`, `EncryptedBool`: opaque ciphertext references
//! - `Executor` / `Fhe`: homomorphic operations over handles
//! - `AccessControlList`: decryption grants
//! - `InputVerifier`: encrypted input ingestion
//! - `Decryptor` / `Gateway`: ACL-checked readback
//! - `MockCoprocessor`: in-process reference executor

pub mod acl;
pub mod executor;
pub mod gateway;
pub mod handle;
pub mod input;
pub mod mock;

pub use acl::{AccessControlList, InMemoryAcl};
pub use executor::{BinaryOp, Executor, Fhe, FheResult, Opcode};
pub use gateway::{Decryptor, Gateway};
pub use handle::{ConfidentialAmount, EncryptedBool, FheType, Handle, HandleParseError};
pub use input::{EncryptedInput, InputVerifier};
pub use mock::MockCoprocessor;
