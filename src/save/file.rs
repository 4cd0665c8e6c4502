//! JSON file store
//!
//! One pretty-printed JSON file per user under the store directory. Writes go
//! to a temporary file first and are renamed into place, so a crash mid-write
//! never leaves a half-written book behind.

use std::fs;
use std::path::{Path, PathBuf};

use super::store::{Books, EconomyStore, StorageError, UserBook, BOOK_VERSION};
use crate::economy::{EconomyAccount, EconomyError, UserId};

/// Store backed by a directory of JSON files
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    books: Books,
}

impl JsonFileStore {
    /// Open (or create) a store directory and load every book in it
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let books = Books::new();
        let mut loaded = 0;
        for entry in fs::read_dir(&dir).map_err(|e| io_error(&dir, e))? {
            let path = entry.map_err(|e| io_error(&dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            books.load(read_book(&path)?);
            loaded += 1;
        }

        log::info!("Opened store at {:?} ({} accounts)", dir, loaded);
        Ok(Self { dir, books })
    }

    /// Platform data directory, falling back to `./data`
    pub fn default_dir() -> PathBuf {
        use directories::ProjectDirs;

        if let Some(proj_dirs) = ProjectDirs::from("com", "lunaris", "Lunaris") {
            let mut path = proj_dirs.data_local_dir().to_path_buf();
            path.push("accounts");
            path
        } else {
            PathBuf::from("./data")
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding a user's book
    pub fn book_path(&self, user_id: &UserId) -> PathBuf {
        let name: String = user_id.as_str().bytes().map(|b| format!("{:02x}", b)).collect();
        self.dir.join(format!("{}.json", name))
    }

    fn persist(&self, book: &UserBook) -> Result<(), StorageError> {
        let path = self.book_path(book.account().user_id());
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(book).map_err(|source| StorageError::Serde {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;

        log::debug!("Saved book for {} to {:?}", book.account().user_id(), path);
        Ok(())
    }
}

impl EconomyStore for JsonFileStore {
    fn create_account(&self, user_id: &UserId) -> Result<EconomyAccount, EconomyError> {
        self.books.create(user_id, |book| self.persist(book))
    }

    fn snapshot(&self, user_id: &UserId) -> Result<Option<UserBook>, EconomyError> {
        Ok(self.books.snapshot(user_id))
    }

    fn transact<R, F>(&self, user_id: &UserId, f: F) -> Result<R, EconomyError>
    where
        F: FnOnce(&mut UserBook) -> Result<R, EconomyError>,
    {
        self.books.transact(user_id, f, |book| self.persist(book))
    }

    fn user_ids(&self) -> Vec<UserId> {
        self.books.user_ids()
    }
}

fn read_book(path: &Path) -> Result<UserBook, StorageError> {
    let data = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let book: UserBook = serde_json::from_str(&data).map_err(|source| StorageError::Serde {
        path: path.to_path_buf(),
        source,
    })?;

    if book.version() != BOOK_VERSION {
        return Err(StorageError::VersionMismatch {
            path: path.to_path_buf(),
            expected: BOOK_VERSION,
            found: book.version(),
        });
    }
    Ok(book)
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io { path: path.to_path_buf(), source }
}
