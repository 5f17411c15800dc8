//! Reference coprocessor
//!
//! Plays the role of the external FHE coprocessor in-process: it owns the
//! plaintexts behind each handle, evaluates operations, verifies encrypted
//! inputs and serves decryption to the gateway. The ledger itself only ever
//! holds handles.
//!
//! # Input format
//! ```text
//! ciphertext = nonce(16) || (value_le XOR keccak256(network_key || nonce)[..8])
//! proof      = keccak256("input-proof" || ciphertext || ledger || submitter)
//! ```
//!
//! # Handle derivation
//! `keccak256(op || operands || counter)` with the type tag in the last byte.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use rand::RngCore;
use sha3::{Digest, Keccak256};

use super::executor::{BinaryOp, Executor, FheResult, Opcode};
use super::handle::{ConfidentialAmount, FheType, Handle};
use super::input::{EncryptedInput, InputVerifier};
use crate::error::{FheError, LedgerError, LedgerResult};
use crate::types::Address;

const NONCE_LEN: usize = 16;
const CIPHERTEXT_LEN: usize = NONCE_LEN + 8;
const PROOF_DOMAIN: &[u8] = b"input-proof";

#[derive(Debug, Clone, Copy)]
struct Plaintext {
    ty: FheType,
    value: u64,
}

#[derive(Debug, Default)]
struct CoprocessorState {
    ciphertexts: HashMap<Handle, Plaintext>,
    counter: u64,
}

/// In-process FHE coprocessor
#[derive(Debug)]
pub struct MockCoprocessor {
    network_key: [u8; 32],
    state: RwLock<CoprocessorState>,
    trace: Mutex<Vec<Opcode>>,
}

impl Default for MockCoprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCoprocessor {
    /// Coprocessor with a random network key
    pub fn new() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::with_key(key)
    }

    pub fn with_key(network_key: [u8; 32]) -> Self {
        Self {
            network_key,
            state: RwLock::new(CoprocessorState::default()),
            trace: Mutex::new(Vec::new()),
        }
    }

    /// Client-side encryption of `value` for submission to `ledger` by `submitter`
    pub fn encrypt_input(
        &self,
        value: u64,
        ledger: &Address,
        submitter: &Address,
    ) -> EncryptedInput {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let pad = self.keystream(&nonce);
        let mut ciphertext = Vec::with_capacity(CIPHERTEXT_LEN);
        ciphertext.extend_from_slice(&nonce);
        ciphertext.extend(value.to_le_bytes().iter().zip(pad.iter()).map(|(v, k)| v ^ k));

        let proof = input_proof(&ciphertext, ledger, submitter);
        EncryptedInput { ciphertext, proof }
    }

    /// Plaintext behind a handle. Only the decryption gateway and tests call
    /// this; it performs no access check of its own.
    pub(crate) fn reveal(&self, handle: Handle) -> FheResult<u64> {
        self.load(handle).map(|p| p.value)
    }

    /// Drain the instruction trace recorded since the last call
    pub fn take_trace(&self) -> Vec<Opcode> {
        let mut trace = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *trace)
    }

    /// Number of ciphertexts currently held
    pub fn ciphertext_count(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.ciphertexts.len()
    }

    fn keystream(&self, nonce: &[u8]) -> [u8; 8] {
        let digest = Keccak256::new()
            .chain_update(self.network_key)
            .chain_update(nonce)
            .finalize();
        let mut pad = [0u8; 8];
        pad.copy_from_slice(&digest[..8]);
        pad
    }

    fn load(&self, handle: Handle) -> FheResult<Plaintext> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .ciphertexts
            .get(&handle)
            .copied()
            .ok_or(FheError::UnknownHandle(handle))
    }

    fn load_typed(&self, handle: Handle, ty: FheType) -> FheResult<u64> {
        let plaintext = self.load(handle)?;
        if plaintext.ty != ty {
            return Err(FheError::TypeMismatch {
                handle,
                expected: ty.name(),
            });
        }
        Ok(plaintext.value)
    }

    fn store(&self, op: Opcode, preimage: &[u8], ty: FheType, value: u64) -> Handle {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.counter += 1;

        let digest: [u8; 32] = Keccak256::new()
            .chain_update(opcode_tag(op))
            .chain_update(preimage)
            .chain_update(state.counter.to_be_bytes())
            .finalize()
            .into();
        let handle = Handle::tagged(digest, ty);
        state.ciphertexts.insert(handle, Plaintext { ty, value });
        drop(state);

        self.record(op);
        tracing::debug!(?op, %handle, "coprocessor op");
        handle
    }

    fn record(&self, op: Opcode) {
        let mut trace = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        trace.push(op);
    }
}

impl Executor for MockCoprocessor {
    fn binary_op(&self, op: BinaryOp, lhs: Handle, rhs: Handle) -> FheResult<Handle> {
        let a = self.load_typed(lhs, FheType::Uint64)?;
        let b = self.load_typed(rhs, FheType::Uint64)?;

        let (ty, value) = match op {
            BinaryOp::Add => (FheType::Uint64, a.wrapping_add(b)),
            BinaryOp::Sub => (FheType::Uint64, a.wrapping_sub(b)),
            BinaryOp::Mul => (FheType::Uint64, a.wrapping_mul(b)),
            BinaryOp::Div => (FheType::Uint64, a.checked_div(b).unwrap_or(u64::MAX)),
            BinaryOp::Min => (FheType::Uint64, a.min(b)),
            BinaryOp::Ge => (FheType::Bool, u64::from(a >= b)),
        };

        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(lhs.as_bytes());
        preimage.extend_from_slice(rhs.as_bytes());
        Ok(self.store(Opcode::Binary(op), &preimage, ty, value))
    }

    fn select(&self, cond: Handle, if_true: Handle, if_false: Handle) -> FheResult<Handle> {
        let c = self.load_typed(cond, FheType::Bool)?;
        let t = self.load_typed(if_true, FheType::Uint64)?;
        let f = self.load_typed(if_false, FheType::Uint64)?;

        // mask is all ones when c == 1, zero otherwise
        let mask = 0u64.wrapping_sub(c & 1);
        let value = (t & mask) | (f & !mask);

        let mut preimage = Vec::with_capacity(96);
        preimage.extend_from_slice(cond.as_bytes());
        preimage.extend_from_slice(if_true.as_bytes());
        preimage.extend_from_slice(if_false.as_bytes());
        Ok(self.store(Opcode::Select, &preimage, FheType::Uint64, value))
    }

    fn trivial_encrypt(&self, value: u64) -> FheResult<Handle> {
        Ok(self.store(
            Opcode::TrivialEncrypt,
            &value.to_be_bytes(),
            FheType::Uint64,
            value,
        ))
    }
}

impl InputVerifier for MockCoprocessor {
    fn verify_input(
        &self,
        input: &EncryptedInput,
        ledger: &Address,
        submitter: &Address,
    ) -> LedgerResult<ConfidentialAmount> {
        if input.ciphertext.len() != CIPHERTEXT_LEN {
            tracing::warn!(%submitter, len = input.ciphertext.len(), "malformed input ciphertext");
            return Err(LedgerError::ProofVerification(format!(
                "ciphertext must be {} bytes, got {}",
                CIPHERTEXT_LEN,
                input.ciphertext.len()
            )));
        }

        let expected = input_proof(&input.ciphertext, ledger, submitter);
        if expected != input.proof {
            tracing::warn!(%submitter, %ledger, "input proof mismatch");
            return Err(LedgerError::ProofVerification(
                "proof is not bound to this ledger and submitter".to_string(),
            ));
        }

        let (nonce, body) = input.ciphertext.split_at(NONCE_LEN);
        let pad = self.keystream(nonce);
        let mut value_bytes = [0u8; 8];
        for (i, byte) in value_bytes.iter_mut().enumerate() {
            *byte = body[i] ^ pad[i];
        }
        let value = u64::from_le_bytes(value_bytes);

        let handle = self.store(Opcode::VerifyInput, &input.proof, FheType::Uint64, value);
        Ok(ConfidentialAmount::from_handle(handle))
    }
}

fn input_proof(ciphertext: &[u8], ledger: &Address, submitter: &Address) -> [u8; 32] {
    Keccak256::new()
        .chain_update(PROOF_DOMAIN)
        .chain_update(ciphertext)
        .chain_update(ledger.as_bytes())
        .chain_update(submitter.as_bytes())
        .finalize()
        .into()
}

fn opcode_tag(op: Opcode) -> [u8; 2] {
    match op {
        Opcode::Binary(b) => [0x01, b.code()],
        Opcode::Select => [0x02, 0],
        Opcode::TrivialEncrypt => [0x03, 0],
        Opcode::VerifyInput => [0x04, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parties() -> (Address, Address) {
        (Address::from_low_u64(0x1ed9e5), Address::from_low_u64(0xa11ce))
    }

    #[test]
    fn test_input_round_trip() {
        let cp = MockCoprocessor::new();
        let (ledger, alice) = parties();

        let input = cp.encrypt_input(1000, &ledger, &alice);
        let amount = cp.verify_input(&input, &ledger, &alice).unwrap();
        assert_eq!(cp.reveal(amount.handle()).unwrap(), 1000);
        assert_eq!(amount.handle().fhe_type(), Some(FheType::Uint64));
    }

    #[test]
    fn test_ciphertext_hides_value() {
        let cp = MockCoprocessor::new();
        let (ledger, alice) = parties();

        let input = cp.encrypt_input(1000, &ledger, &alice);
        assert_ne!(&input.ciphertext[NONCE_LEN..], &1000u64.to_le_bytes()[..]);
    }

    #[test]
    fn test_input_bound_to_submitter() {
        let cp = MockCoprocessor::new();
        let (ledger, alice) = parties();
        let mallory = Address::from_low_u64(0xbad);

        let input = cp.encrypt_input(1000, &ledger, &alice);
        let result = cp.verify_input(&input, &ledger, &mallory);
        assert!(matches!(result, Err(LedgerError::ProofVerification(_))));
    }

    #[test]
    fn test_input_bound_to_ledger() {
        let cp = MockCoprocessor::new();
        let (ledger, alice) = parties();
        let other_ledger = Address::from_low_u64(0x07e2);

        let input = cp.encrypt_input(1000, &ledger, &alice);
        let result = cp.verify_input(&input, &other_ledger, &alice);
        assert!(matches!(result, Err(LedgerError::ProofVerification(_))));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cp = MockCoprocessor::new();
        let (ledger, alice) = parties();

        let mut input = cp.encrypt_input(1000, &ledger, &alice);
        input.ciphertext[NONCE_LEN] ^= 0x01;
        assert!(cp.verify_input(&input, &ledger, &alice).is_err());

        input.ciphertext.truncate(4);
        assert!(cp.verify_input(&input, &ledger, &alice).is_err());
    }

    #[test]
    fn test_unknown_handle() {
        let cp = MockCoprocessor::new();
        let forged = Handle::tagged([9; 32], FheType::Uint64);
        assert_eq!(cp.reveal(forged), Err(FheError::UnknownHandle(forged)));

        let known = cp.trivial_encrypt(1).unwrap();
        assert!(cp.binary_op(BinaryOp::Add, known, forged).is_err());
    }

    #[test]
    fn test_trace_records_ops() {
        let cp = MockCoprocessor::new();
        let a = cp.trivial_encrypt(2).unwrap();
        let b = cp.trivial_encrypt(3).unwrap();
        cp.binary_op(BinaryOp::Mul, a, b).unwrap();

        assert_eq!(
            cp.take_trace(),
            vec![
                Opcode::TrivialEncrypt,
                Opcode::TrivialEncrypt,
                Opcode::Binary(BinaryOp::Mul)
            ]
        );
        assert!(cp.take_trace().is_empty());
        assert_eq!(cp.ciphertext_count(), 3);
    }
}
