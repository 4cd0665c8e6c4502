//! Store abstraction
//!
//! A store keeps one [`UserBook`] per user and applies changes to it as a
//! single unit: the closure passed to [`EconomyStore::transact`] sees a
//! working copy, and the copy only replaces the stored book after it has
//! been persisted.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::economy::{EconomyAccount, EconomyError, ExpTransaction, LevelHistoryEntry, PurchaseRecord, UserId};

/// Current book format version
pub const BOOK_VERSION: u32 = 1;

/// Persistence failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode or decode {path:?}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("book version mismatch in {path:?}: expected {expected}, found {found}")]
    VersionMismatch { path: PathBuf, expected: u32, found: u32 },
}

/// Everything the engine tracks for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBook {
    version: u32,
    pub(crate) account: EconomyAccount,
    pub(crate) transactions: Vec<ExpTransaction>,
    pub(crate) level_history: Vec<LevelHistoryEntry>,
    #[serde(default)]
    pub(crate) purchases: Vec<PurchaseRecord>,
    /// Earned achievement ids and when they were earned
    #[serde(default)]
    pub(crate) achievements: BTreeMap<String, DateTime<Utc>>,
}

impl UserBook {
    pub fn new(user_id: UserId) -> Self {
        Self {
            version: BOOK_VERSION,
            account: EconomyAccount::new(user_id),
            transactions: Vec::new(),
            level_history: Vec::new(),
            purchases: Vec::new(),
            achievements: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn account(&self) -> &EconomyAccount {
        &self.account
    }

    /// EXP ledger, oldest first
    pub fn transactions(&self) -> &[ExpTransaction] {
        &self.transactions
    }

    /// Level transitions, oldest first
    pub fn level_history(&self) -> &[LevelHistoryEntry] {
        &self.level_history
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.purchases
    }

    pub fn earned_achievements(&self) -> HashSet<String> {
        self.achievements.keys().cloned().collect()
    }
}

/// Durable home for user books
pub trait EconomyStore: Send + Sync {
    /// Create a fresh book; fails if the user already has one
    fn create_account(&self, user_id: &UserId) -> Result<EconomyAccount, EconomyError>;

    /// Consistent copy of a user's book
    fn snapshot(&self, user_id: &UserId) -> Result<Option<UserBook>, EconomyError>;

    /// Apply `f` to the user's book as one atomic unit.
    ///
    /// Calls for the same user are serialized. If `f` fails or the result
    /// cannot be persisted, the stored book is left unchanged.
    fn transact<R, F>(&self, user_id: &UserId, f: F) -> Result<R, EconomyError>
    where
        F: FnOnce(&mut UserBook) -> Result<R, EconomyError>;

    fn user_ids(&self) -> Vec<UserId>;
}

/// In-memory book table shared by the store implementations.
///
/// Each book sits behind its own lock so updates to different users do not
/// contend.
#[derive(Debug, Default)]
pub(crate) struct Books {
    entries: RwLock<HashMap<UserId, Arc<Mutex<UserBook>>>>,
}

impl Books {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Load an existing book without persisting it
    pub(crate) fn load(&self, book: UserBook) {
        let user_id = book.account.user_id().clone();
        self.entries.write().insert(user_id, Arc::new(Mutex::new(book)));
    }

    pub(crate) fn create<P>(&self, user_id: &UserId, persist: P) -> Result<EconomyAccount, EconomyError>
    where
        P: FnOnce(&UserBook) -> Result<(), StorageError>,
    {
        let mut entries = self.entries.write();
        if entries.contains_key(user_id) {
            return Err(EconomyError::AccountExists(user_id.clone()));
        }
        let book = UserBook::new(user_id.clone());
        persist(&book)?;
        let account = book.account.clone();
        entries.insert(user_id.clone(), Arc::new(Mutex::new(book)));
        Ok(account)
    }

    pub(crate) fn snapshot(&self, user_id: &UserId) -> Option<UserBook> {
        self.get(user_id).map(|book| book.lock().clone())
    }

    pub(crate) fn transact<R, F, P>(&self, user_id: &UserId, f: F, persist: P) -> Result<R, EconomyError>
    where
        F: FnOnce(&mut UserBook) -> Result<R, EconomyError>,
        P: FnOnce(&UserBook) -> Result<(), StorageError>,
    {
        let book = self
            .get(user_id)
            .ok_or_else(|| EconomyError::AccountNotFound(user_id.clone()))?;
        let mut guard = book.lock();

        // Whole-book copy and rewrite: cost grows with the ledger length
        let mut working = guard.clone();
        let result = f(&mut working)?;
        persist(&working)?;
        *guard = working;

        Ok(result)
    }

    pub(crate) fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn get(&self, user_id: &UserId) -> Option<Arc<Mutex<UserBook>>> {
        self.entries.read().get(user_id).cloned()
    }
}
