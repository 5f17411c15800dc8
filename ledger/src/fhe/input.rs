//! Encrypted input submission
//!
//! Clients never hand the ledger a raw handle. They submit a ciphertext plus
//! a proof bound to `(ledger address, submitter)`; the verifier checks the
//! binding and registers the ciphertext, returning a fresh handle.

use serde::{Deserialize, Serialize};

use super::handle::ConfidentialAmount;
use crate::error::LedgerResult;
use crate::types::Address;

/// Ciphertext plus validity proof, as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub proof: [u8; 32],
}

/// Verifies encrypted inputs and turns them into usable handles
pub trait InputVerifier: Send + Sync {
    /// Fails with `LedgerError::ProofVerification` when the proof does not
    /// match the ciphertext, the ledger, or the submitter.
    fn verify_input(
        &self,
        input: &EncryptedInput,
        ledger: &Address,
        submitter: &Address,
    ) -> LedgerResult<ConfidentialAmount>;
}
