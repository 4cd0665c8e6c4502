//! Volatile store, used for tests and previews

use super::store::{Books, EconomyStore, UserBook};
use crate::economy::{EconomyAccount, EconomyError, UserId};

/// Store that keeps books in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: Books,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { books: Books::new() }
    }
}

impl EconomyStore for MemoryStore {
    fn create_account(&self, user_id: &UserId) -> Result<EconomyAccount, EconomyError> {
        self.books.create(user_id, |_| Ok(()))
    }

    fn snapshot(&self, user_id: &UserId) -> Result<Option<UserBook>, EconomyError> {
        Ok(self.books.snapshot(user_id))
    }

    fn transact<R, F>(&self, user_id: &UserId, f: F) -> Result<R, EconomyError>
    where
        F: FnOnce(&mut UserBook) -> Result<R, EconomyError>,
    {
        self.books.transact(user_id, f, |_| Ok(()))
    }

    fn user_ids(&self) -> Vec<UserId> {
        self.books.user_ids()
    }
}
