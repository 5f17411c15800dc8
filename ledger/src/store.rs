//! Account storage
//!
//! Maps a principal to its encrypted `Account`. Absent principals read as a
//! zero-balance record; there is no "not found" case. Writes replace the
//! whole record.

use std::collections::HashMap;

use serde::Serialize;

use crate::fhe::ConfidentialAmount;
use crate::types::Address;

/// Per-principal encrypted position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    pub deposit: ConfidentialAmount,
    pub debt: ConfidentialAmount,
}

impl Account {
    /// Record whose fields both point at `zero`
    pub fn zeroed(zero: ConfidentialAmount) -> Self {
        Self { deposit: zero, debt: zero }
    }
}

/// Account storage interface
pub trait AccountStore: Send + Sync {
    /// Full record for `account`, zero-initialized if never written
    fn get(&self, account: &Address) -> Account;

    /// Replace the record for `account`
    fn set(&mut self, account: Address, record: Account);

    /// Whether `account` has ever been written
    fn contains(&self, account: &Address) -> bool;

    /// Number of stored accounts
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// HashMap-backed store
#[derive(Debug, Clone)]
pub struct InMemoryAccountStore {
    zero: ConfidentialAmount,
    accounts: HashMap<Address, Account>,
}

impl InMemoryAccountStore {
    /// `zero` is the encrypted zero used for untouched accounts
    pub fn new(zero: ConfidentialAmount) -> Self {
        Self {
            zero,
            accounts: HashMap::new(),
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, account: &Address) -> Account {
        self.accounts
            .get(account)
            .copied()
            .unwrap_or_else(|| Account::zeroed(self.zero))
    }

    fn set(&mut self, account: Address, record: Account) {
        self.accounts.insert(account, record);
    }

    fn contains(&self, account: &Address) -> bool {
        self.accounts.contains_key(account)
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::Handle;

    fn amount(byte: u8) -> ConfidentialAmount {
        ConfidentialAmount::from_handle(Handle::from_bytes([byte; 32]))
    }

    #[test]
    fn test_absent_account_is_zeroed() {
        let store = InMemoryAccountStore::new(amount(0));
        let alice = Address::from_low_u64(1);

        let record = store.get(&alice);
        assert_eq!(record, Account::zeroed(amount(0)));
        assert!(!store.contains(&alice));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_replaces_record() {
        let mut store = InMemoryAccountStore::new(amount(0));
        let alice = Address::from_low_u64(1);

        store.set(alice, Account { deposit: amount(1), debt: amount(2) });
        store.set(alice, Account { deposit: amount(3), debt: amount(4) });

        assert_eq!(store.get(&alice), Account { deposit: amount(3), debt: amount(4) });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_accounts_are_independent() {
        let mut store = InMemoryAccountStore::new(amount(0));
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);

        store.set(alice, Account { deposit: amount(5), debt: amount(0) });
        assert_eq!(store.get(&bob), Account::zeroed(amount(0)));
    }
}
