//! Decryption gateway
//!
//! Readback path used by clients and tests: resolves a handle to its
//! plaintext only for principals the ACL has granted.

use std::sync::Arc;

use super::acl::AccessControlList;
use super::handle::Handle;
use super::mock::MockCoprocessor;
use crate::error::{LedgerError, LedgerResult};
use crate::types::Address;

/// Decrypts handles on behalf of authorized principals
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, handle: Handle, principal: &Address) -> LedgerResult<u64>;
}

/// Gateway over the reference coprocessor
#[derive(Clone)]
pub struct Gateway {
    coprocessor: Arc<MockCoprocessor>,
    acl: Arc<dyn AccessControlList>,
}

impl Gateway {
    pub fn new(coprocessor: Arc<MockCoprocessor>, acl: Arc<dyn AccessControlList>) -> Self {
        Self { coprocessor, acl }
    }
}

impl Decryptor for Gateway {
    fn decrypt(&self, handle: Handle, principal: &Address) -> LedgerResult<u64> {
        if !self.acl.is_allowed(handle, principal) {
            tracing::warn!(%handle, %principal, "decryption refused");
            return Err(LedgerError::NotAuthorized {
                handle,
                principal: *principal,
            });
        }
        Ok(self.coprocessor.reveal(handle)?)
    }
}
