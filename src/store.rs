//! Table store
//!
//! SQLite-backed `rainbow(hash, word)` table. Every write happens inside an
//! open transaction; rows become durable only at [`TableStore::checkpoint`]
//! or [`TableStore::commit`]. Dropping the store without committing rolls the
//! open transaction back and leaves earlier commits untouched.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS rainbow (hash TEXT PRIMARY KEY, word TEXT)";

const INSERT_ENTRY: &str = "INSERT INTO rainbow (hash, word) VALUES (?1, ?2) ON CONFLICT(hash) DO NOTHING";

/// A row of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainbowEntry<'a> {
    pub hash: &'a str,
    pub word: &'a str,
}

/// Result of a single insert
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The hash was already present; the existing row is kept
    Conflict,
}

/// State of the `rainbow` table after [`TableStore::init_schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Created,
    Existing,
}

pub struct TableStore {
    conn: Connection,
    path: PathBuf,
    uncommitted: u64,
    commits: u64,
}

impl TableStore {
    /// Open (or create) the database and start the first transaction
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::store("open the database"))?;
        conn.execute_batch("BEGIN")
            .map_err(Error::store("begin a transaction"))?;

        log::debug!("Opened table store {:?}", path);

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            uncommitted: 0,
            commits: 0,
        })
    }

    /// Ensure the `rainbow` table exists without touching existing rows
    pub fn init_schema(&mut self) -> Result<Schema> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'rainbow'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::store("inspect the schema"))?;

        if existing.is_some() {
            log::info!("Table 'rainbow' already exists, appending to it");
            return Ok(Schema::Existing);
        }

        self.conn
            .execute_batch(CREATE_TABLE)
            .map_err(Error::store("create the rainbow table"))?;
        Ok(Schema::Created)
    }

    /// Add an entry unless its hash is already in the table
    pub fn insert(&mut self, entry: RainbowEntry<'_>) -> Result<InsertOutcome> {
        let changed = self
            .conn
            .prepare_cached(INSERT_ENTRY)
            .and_then(|mut stmt| stmt.execute(params![entry.hash, entry.word]))
            .map_err(Error::store("insert a row"))?;

        if changed == 0 {
            return Ok(InsertOutcome::Conflict);
        }

        self.uncommitted += 1;
        Ok(InsertOutcome::Inserted)
    }

    /// Commit everything written so far and continue in a new transaction
    pub fn checkpoint(&mut self) -> Result<()> {
        self.conn
            .execute_batch("COMMIT; BEGIN")
            .map_err(Error::store("commit"))?;

        log::debug!("Committed {} rows to {:?}", self.uncommitted, self.path);
        self.uncommitted = 0;
        self.commits += 1;
        Ok(())
    }

    /// Commit the open transaction and close the database
    ///
    /// Returns the number of commits made over the store's lifetime.
    pub fn commit(mut self) -> Result<u64> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(Error::store("commit"))?;
        self.commits += 1;

        let commits = self.commits;
        self.conn
            .close()
            .map_err(|(_, source)| Error::StoreUnavailable {
                context: "close the database",
                source,
            })?;
        Ok(commits)
    }

    /// Rows inserted since the last commit
    pub fn uncommitted(&self) -> u64 {
        self.uncommitted
    }

    /// Total rows in the table, including uncommitted ones
    pub fn len(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rainbow", [], |row| row.get(0))
            .map_err(Error::store("count rows"))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Word stored for a hash, if any
    pub fn word_for(&self, hash: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT word FROM rainbow WHERE hash = ?1", [hash], |row| row.get(0))
            .optional()
            .map_err(Error::store("look up a hash"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry<'a>(hash: &'a str, word: &'a str) -> RainbowEntry<'a> {
        RainbowEntry { hash, word }
    }

    #[test]
    fn test_insert_and_conflict() {
        let dir = TempDir::new().unwrap();
        let mut store = TableStore::open(&dir.path().join("rainbow.db")).unwrap();
        assert_eq!(store.init_schema().unwrap(), Schema::Created);

        assert_eq!(store.insert(entry("aa", "apple")).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert(entry("bb", "banana")).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert(entry("aa", "avocado")).unwrap(), InsertOutcome::Conflict);

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.uncommitted(), 2);
        assert_eq!(store.word_for("aa").unwrap().as_deref(), Some("apple"));
        assert_eq!(store.word_for("cc").unwrap(), None);
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rainbow.db");

        let mut store = TableStore::open(&path).unwrap();
        store.init_schema().unwrap();
        let _ = store.insert(entry("aa", "apple")).unwrap();
        assert_eq!(store.init_schema().unwrap(), Schema::Existing);
        assert_eq!(store.len().unwrap(), 1);
        store.commit().unwrap();

        let mut store = TableStore::open(&path).unwrap();
        assert_eq!(store.init_schema().unwrap(), Schema::Existing);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_drop_without_commit_keeps_prior_commits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rainbow.db");

        let mut store = TableStore::open(&path).unwrap();
        store.init_schema().unwrap();
        let _ = store.insert(entry("aa", "apple")).unwrap();
        store.checkpoint().unwrap();
        let _ = store.insert(entry("bb", "banana")).unwrap();
        drop(store);

        let mut store = TableStore::open(&path).unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.word_for("bb").unwrap(), None);
    }

    #[test]
    fn test_commit_counts() {
        let dir = TempDir::new().unwrap();
        let mut store = TableStore::open(&dir.path().join("rainbow.db")).unwrap();
        store.init_schema().unwrap();

        let _ = store.insert(entry("aa", "apple")).unwrap();
        store.checkpoint().unwrap();
        assert_eq!(store.uncommitted(), 0);

        assert_eq!(store.commit().unwrap(), 2);
    }

    #[test]
    fn test_open_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("rainbow.db");

        let err = TableStore::open(&path).err().unwrap();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }
}
