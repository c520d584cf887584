//! Database connection management.

use crate::error::{Error, Result};
use rusqlite::{Connection as SqliteConnection, Transaction};
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of the mission database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPath {
    path: PathBuf,
}

impl DbPath {
    /// Default database filename.
    pub const DEFAULT: &'static str = "mars.db";

    /// Marker for a private in-memory database.
    pub const MEMORY: &'static str = ":memory:";

    /// Create a DbPath with the default filename "mars.db".
    pub fn default_path() -> Self {
        Self::new(Self::DEFAULT)
    }

    /// Create a DbPath for an in-memory database.
    pub fn memory() -> Self {
        Self::new(Self::MEMORY)
    }

    /// Create a DbPath from a path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path as a reference.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether this points at an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == Self::MEMORY
    }
}

impl Default for DbPath {
    fn default() -> Self {
        Self::default_path()
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&str> for DbPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Database connection wrapper.
pub struct Connection {
    conn: SqliteConnection,
}

impl Connection {
    /// Open a connection to the database at the given location.
    pub fn open(path: &DbPath) -> Result<Self> {
        let conn = if path.is_memory() {
            SqliteConnection::open_in_memory()
        } else {
            SqliteConnection::open(path.as_path())
        }
        .map_err(Error::Connection)?;
        Self::configure(conn)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DbPath::memory())
    }

    fn configure(conn: SqliteConnection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(Error::Connection)?;
        Ok(Self { conn })
    }

    /// Begin a new transaction.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn.transaction().map_err(Error::from)
    }

    /// Get a reference to the underlying SqliteConnection.
    pub fn as_conn(&self) -> &SqliteConnection {
        &self.conn
    }

    /// Query a single row.
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<T>
    where
        P: rusqlite::Params,
        F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn.query_row(sql, params, f).map_err(Error::from)
    }

    /// Query multiple rows.
    pub fn query<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: rusqlite::Params,
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Check if a table exists.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
        Ok(stmt.exists([table_name])?)
    }

    /// Close the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::Connection(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_default() {
        let path = DbPath::default_path();
        assert_eq!(path.as_path(), Path::new("mars.db"));
        assert!(!path.is_memory());
    }

    #[test]
    fn test_db_path_memory() {
        let path = DbPath::memory();
        assert!(path.is_memory());
        assert_eq!(path.to_string(), ":memory:");
    }

    #[test]
    fn test_open_enables_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = DbPath::new(dir.path().join("missions.db"));
        let conn = Connection::open(&path).unwrap();
        conn.as_conn()
            .execute("CREATE TABLE probe (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        conn.close().unwrap();
        assert!(path.as_path().exists());
    }

    #[test]
    fn test_open_unreachable_path_is_connection_error() {
        let path = DbPath::new("/nonexistent-dir/definitely/missing/mars.db");
        assert!(matches!(Connection::open(&path), Err(Error::Connection(_))));
    }

    #[test]
    fn test_transaction_rollback_on_drop() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.as_conn()
            .execute("CREATE TABLE probe (name TEXT NOT NULL)", [])
            .unwrap();

        {
            let tx = conn.transaction().unwrap();
            tx.execute("INSERT INTO probe (name) VALUES (?1)", ["Beagle 2"])
                .unwrap();
            drop(tx);
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM probe", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!conn.table_exists("probe").unwrap());
        conn.as_conn()
            .execute("CREATE TABLE probe (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        assert!(conn.table_exists("probe").unwrap());
    }
}
