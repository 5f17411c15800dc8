//! Access control list for decryption rights
//!
//! The ledger holds no keys. It only records which principals may later ask
//! the decryption gateway for the plaintext behind a handle.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use super::handle::Handle;
use crate::types::Address;

/// Grants and checks decryption rights
pub trait AccessControlList: Send + Sync {
    /// Allow `principal` to decrypt `handle`. Idempotent.
    fn allow(&self, handle: Handle, principal: &Address);

    fn is_allowed(&self, handle: Handle, principal: &Address) -> bool;
}

/// In-memory ACL
#[derive(Debug, Default)]
pub struct InMemoryAcl {
    grants: RwLock<HashMap<Handle, HashSet<Address>>>,
}

impl InMemoryAcl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of principals allowed on `handle`
    pub fn grant_count(&self, handle: Handle) -> usize {
        let grants = self.grants.read().unwrap_or_else(PoisonError::into_inner);
        grants.get(&handle).map_or(0, HashSet::len)
    }
}

impl AccessControlList for InMemoryAcl {
    fn allow(&self, handle: Handle, principal: &Address) {
        let mut grants = self.grants.write().unwrap_or_else(PoisonError::into_inner);
        let inserted = grants.entry(handle).or_default().insert(*principal);
        if inserted {
            tracing::trace!(%handle, %principal, "acl grant");
        }
    }

    fn is_allowed(&self, handle: Handle, principal: &Address) -> bool {
        let grants = self.grants.read().unwrap_or_else(PoisonError::into_inner);
        grants.get(&handle).is_some_and(|set| set.contains(principal))
    }
}
