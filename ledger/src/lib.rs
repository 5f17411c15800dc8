//! Confidential Lending Ledger
//!
//! Deposit, borrow, accrue interest and repay while every amount stays
//! encrypted. The ledger recombines ciphertext handles and never decrypts;
//! borrowing decisions are taken with a branchless select, so a rejected
//! borrow is indistinguishable from a successful borrow of zero.
//!
//! # Modules
//! - `fhe`: handles, executor seam, ACL, input verification, decryption gateway
//! - `store`: encrypted account records
//! - `rate`: owner-gated interest rate
//! - `ledger`: the four state transitions
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use confidential_lending_ledger::{
//!     Address, Collaborators, ConfidentialLedger, Decryptor, Gateway, InMemoryAcl,
//!     LedgerConfig, MockCoprocessor,
//! };
//!
//! let coprocessor = Arc::new(MockCoprocessor::new());
//! let acl = Arc::new(InMemoryAcl::new());
//! let config = LedgerConfig { address, owner, interest_rate_bps: 100 };
//! let collaborators = Collaborators::mock(coprocessor.clone(), acl.clone());
//! let mut ledger = ConfidentialLedger::new(config, collaborators)?;
//!
//! let input = coprocessor.encrypt_input(1000, ledger.address(), &alice);
//! ledger.deposit(&alice, &input)?;
//!
//! let gateway = Gateway::new(coprocessor, acl);
//! let deposit = gateway.decrypt(ledger.account(&alice).deposit.handle(), &alice)?;
//! ```

pub mod error;
pub mod fhe;
pub mod ledger;
pub mod rate;
pub mod store;
pub mod types;


// Ledger exports
pub use ledger::{Collaborators, ConfidentialLedger, LedgerConfig};
pub use rate::RateAdmin;
pub use store::{Account, AccountStore, InMemoryAccountStore};

// Error handling
pub use error::validation;
pub use error::{FheError, LedgerError, LedgerResult};

// Encrypted primitives and collaborators
pub use fhe::{
    AccessControlList, ConfidentialAmount, Decryptor, EncryptedBool, EncryptedInput, Executor,
    Fhe, Gateway, Handle, InMemoryAcl, InputVerifier, MockCoprocessor,
};

pub use types::{
    Address, AddressParseError, LedgerEvent, BPS, COLLATERAL_FACTOR_BPS, MAX_INTEREST_RATE_BPS,
};
