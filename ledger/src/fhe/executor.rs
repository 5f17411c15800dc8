//! Encrypted arithmetic executor
//!
//! The `Executor` trait is the seam between the ledger and whatever
//! evaluates homomorphic operations (an FHE coprocessor). The ledger only
//! talks to it through the typed `Fhe` facade, which never returns a
//! plaintext.
//!
//! # Semantics
//! - `euint64` arithmetic is modular (wrapping)
//! - `div` truncates toward zero; division by an encrypted zero yields `u64::MAX`
//! - `select` evaluates to one of two already-computed operands, so the
//!   caller performs the same operations whichever way the condition falls

use std::sync::Arc;

use serde::Serialize;

use super::handle::{ConfidentialAmount, EncryptedBool, Handle};
use crate::error::FheError;

/// Result type for executor calls
pub type FheResult<T> = Result<T, FheError>;

/// Binary operations on `euint64` operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    /// Greater-or-equal, produces an `ebool`
    Ge,
}

impl BinaryOp {
    pub(crate) const fn code(self) -> u8 {
        match self {
            BinaryOp::Add => 0,
            BinaryOp::Sub => 1,
            BinaryOp::Mul => 2,
            BinaryOp::Div => 3,
            BinaryOp::Min => 4,
            BinaryOp::Ge => 5,
        }
    }
}

/// One executed instruction, as seen by an observer of the coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "op", content = "kind", rename_all = "snake_case")]
pub enum Opcode {
    Binary(BinaryOp),
    Select,
    TrivialEncrypt,
    VerifyInput,
}

/// Evaluates homomorphic operations over ciphertext handles
pub trait Executor: Send + Sync {
    /// Apply `op` to two `euint64` handles
    fn binary_op(&self, op: BinaryOp, lhs: Handle, rhs: Handle) -> FheResult<Handle>;

    /// Branchless ternary: `cond ? if_true : if_false`
    fn select(&self, cond: Handle, if_true: Handle, if_false: Handle) -> FheResult<Handle>;

    /// Lift a public constant into an `euint64` ciphertext
    fn trivial_encrypt(&self, value: u64) -> FheResult<Handle>;
}

/// Typed facade over an `Executor`
///
/// # Example
/// ```ignore
/// let fhe = Fhe::new(Arc::new(MockCoprocessor::new()));
/// let bps = fhe.encrypt_constant(10_000)?;
/// let scaled = fhe.mul(debt, bps)?;
/// ```
#[derive(Clone)]
pub struct Fhe {
    executor: Arc<dyn Executor>,
}

impl Fhe {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Lift a public constant into the encrypted domain
    pub fn encrypt_constant(&self, value: u64) -> FheResult<ConfidentialAmount> {
        self.executor
            .trivial_encrypt(value)
            .map(ConfidentialAmount::from_handle)
    }

    pub fn add(
        &self,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.arith(BinaryOp::Add, a, b)
    }

    pub fn sub(
        &self,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.arith(BinaryOp::Sub, a, b)
    }

    pub fn mul(
        &self,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.arith(BinaryOp::Mul, a, b)
    }

    pub fn div(
        &self,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.arith(BinaryOp::Div, a, b)
    }

    pub fn min(
        &self,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.arith(BinaryOp::Min, a, b)
    }

    pub fn ge(&self, a: ConfidentialAmount, b: ConfidentialAmount) -> FheResult<EncryptedBool> {
        self.executor
            .binary_op(BinaryOp::Ge, a.handle(), b.handle())
            .map(EncryptedBool::from_handle)
    }

    pub fn select(
        &self,
        cond: EncryptedBool,
        if_true: ConfidentialAmount,
        if_false: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.executor
            .select(cond.handle(), if_true.handle(), if_false.handle())
            .map(ConfidentialAmount::from_handle)
    }

    fn arith(
        &self,
        op: BinaryOp,
        a: ConfidentialAmount,
        b: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        self.executor
            .binary_op(op, a.handle(), b.handle())
            .map(ConfidentialAmount::from_handle)
    }
}
