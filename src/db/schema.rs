//! Database schema, table dumps and raw value conversion.

use crate::db::Connection;
use crate::error::{Error, Result};
use rusqlite::types::Value;
use rusqlite::Transaction;
use std::collections::BTreeMap;
use tracing::debug;

/// Every table of the schema, parents before children.
pub const TABLES: [&str; 7] = [
    "users",
    "scientist",
    "status",
    "transport",
    "geographical_object",
    "mars_station",
    "location",
];

const CREATE_TABLES: [&str; 7] = [
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        login TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        admin BOOLEAN NOT NULL
    )",
    "CREATE TABLE scientist (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        post TEXT NOT NULL,
        name_organization TEXT NOT NULL,
        address TEXT,
        id_user INTEGER NOT NULL,
        CONSTRAINT fk_scientist_of_users
            FOREIGN KEY (id_user) REFERENCES users(id) ON DELETE CASCADE
    )",
    "CREATE TABLE status (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        status_task TEXT NOT NULL
            CHECK(status_task IN ('entered', 'in_operation', 'completed', 'canceled', 'deleted')),
        status_mission TEXT NOT NULL
            CHECK(status_mission IN ('success', 'loss', 'running'))
    )",
    "CREATE TABLE transport (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        describe TEXT,
        url_photo TEXT
    )",
    "CREATE TABLE geographical_object (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        feature TEXT NOT NULL,
        size INTEGER,
        describe TEXT,
        url_photo TEXT,
        status BOOLEAN NOT NULL
    )",
    "CREATE TABLE mars_station (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type_status TEXT NOT NULL,
        data_create DATE NOT NULL,
        data_from DATE NOT NULL,
        data_close DATE NOT NULL,
        id_scientist INTEGER NOT NULL,
        id_transport INTEGER NOT NULL,
        id_status INTEGER NOT NULL,
        CONSTRAINT fk_mars_station_of_scientist
            FOREIGN KEY (id_scientist) REFERENCES scientist(id) ON DELETE CASCADE,
        CONSTRAINT fk_mars_station_of_transport
            FOREIGN KEY (id_transport) REFERENCES transport(id) ON DELETE CASCADE,
        CONSTRAINT fk_mars_station_of_status
            FOREIGN KEY (id_status) REFERENCES status(id) ON DELETE CASCADE
    )",
    "CREATE TABLE location (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_geographical_object INTEGER NOT NULL,
        id_mars_station INTEGER NOT NULL,
        purpose TEXT,
        results TEXT,
        CONSTRAINT fk_location_of_geographical_object
            FOREIGN KEY (id_geographical_object) REFERENCES geographical_object(id) ON DELETE CASCADE,
        CONSTRAINT fk_location_of_mars_station
            FOREIGN KEY (id_mars_station) REFERENCES mars_station(id) ON DELETE CASCADE
    )",
];

const CREATE_INDEXES: [&str; 6] = [
    "CREATE INDEX idx_scientist_id_user ON scientist(id_user)",
    "CREATE INDEX idx_mars_station_id_scientist ON mars_station(id_scientist)",
    "CREATE INDEX idx_mars_station_id_transport ON mars_station(id_transport)",
    "CREATE INDEX idx_mars_station_id_status ON mars_station(id_status)",
    "CREATE INDEX idx_location_id_geographical_object ON location(id_geographical_object)",
    "CREATE INDEX idx_location_id_mars_station ON location(id_mars_station)",
];

/// Schema management.
pub struct Schema;

impl Schema {
    /// Create all tables, foreign keys and indexes in one transaction.
    ///
    /// Returns an error if any table of the schema already exists.
    pub fn create(conn: &mut Connection) -> Result<()> {
        if Self::is_initialized(conn)? {
            return Err(Error::AlreadyInitialized);
        }

        let tx = conn.transaction()?;
        Self::create_tables(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Drop every table, children first so no cascade fires.
    pub fn drop(conn: &mut Connection) -> Result<()> {
        let tx = conn.transaction()?;
        Self::drop_tables(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Run the table and index DDL inside the caller's transaction.
    pub fn create_tables(tx: &Transaction<'_>) -> Result<()> {
        for ddl in CREATE_TABLES.iter().chain(CREATE_INDEXES.iter()) {
            tx.execute(ddl, [])?;
        }
        Ok(())
    }

    /// Drop every table inside the caller's transaction.
    pub fn drop_tables(tx: &Transaction<'_>) -> Result<()> {
        for table in TABLES.iter().rev() {
            tx.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
        }
        Ok(())
    }

    /// Whether any table of the schema exists.
    pub fn is_initialized(conn: &Connection) -> Result<bool> {
        for table in TABLES {
            if conn.table_exists(table)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Resolve a user-supplied table name against the schema.
    pub fn table(name: &str) -> Result<&'static str> {
        TABLES
            .iter()
            .copied()
            .find(|t| *t == name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Count the rows of one table.
    pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
        let table = Self::table(table)?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
    }

    /// Read every row and column name of one table.
    pub fn dump_table(conn: &Connection, table: &str) -> Result<TableDump> {
        let table = Self::table(table)?;
        let mut stmt = conn
            .as_conn()
            .prepare(&format!("SELECT * FROM {table} ORDER BY id"))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(table, rows = rows.len(), "dumped table");
        Ok(TableDump { columns, rows })
    }
}

/// Column names and raw rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDump {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TableDump {
    /// Rows as column-name to JSON value maps.
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let fields = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| (col.clone(), value_to_json(value)))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(fields)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Contents of the whole database keyed by table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tables: BTreeMap<String, TableDump>,
}

impl Snapshot {
    /// Get the dump for one table.
    pub fn get(&self, table: &str) -> Option<&TableDump> {
        self.tables.get(table)
    }

    /// Number of rows captured for a table, zero if absent.
    pub fn row_count(&self, table: &str) -> usize {
        self.get(table).map_or(0, |t| t.rows.len())
    }

    /// Iterate tables in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TableDump)> {
        TABLES
            .iter()
            .filter_map(|name| self.tables.get(*name).map(|dump| (*name, dump)))
    }

    /// The snapshot as a JSON object keyed by table name.
    pub fn to_json(&self) -> serde_json::Value {
        let tables = self
            .iter()
            .map(|(name, dump)| (name.to_string(), dump.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(tables)
    }
}

/// Convert a raw SQLite value to JSON.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(b) => serde_json::Value::from(format!("<{} bytes>", b.len())),
    }
}

/// Render a raw SQLite value for a text table.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_temp_db() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_schema_create_creates_tables() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();

        for table in TABLES {
            assert!(conn.table_exists(table).unwrap(), "missing {table}");
        }
    }

    #[test]
    fn test_schema_create_fails_if_already_initialized() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();
        assert!(matches!(
            Schema::create(&mut conn).unwrap_err(),
            Error::AlreadyInitialized
        ));
    }

    #[test]
    fn test_schema_drop_removes_tables() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();
        Schema::drop(&mut conn).unwrap();

        assert!(!Schema::is_initialized(&conn).unwrap());
        // Dropping an empty database is a no-op.
        Schema::drop(&mut conn).unwrap();
    }

    #[test]
    fn test_drop_tables_undone_without_commit() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();

        {
            let tx = conn.transaction().unwrap();
            Schema::drop_tables(&tx).unwrap();
            Schema::create_tables(&tx).unwrap();
        }

        for table in TABLES {
            assert!(conn.table_exists(table).unwrap(), "missing {table}");
        }
    }

    #[test]
    fn test_foreign_keys_declared() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();

        let mut total = 0;
        for table in TABLES {
            let fks: Vec<String> = conn
                .query(
                    &format!("SELECT \"table\" FROM pragma_foreign_key_list('{table}')"),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            total += fks.len();
        }
        assert_eq!(total, 6);
    }

    #[test]
    fn test_status_check_constraint() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();

        conn.as_conn()
            .execute(
                "INSERT INTO status (status_task, status_mission) VALUES (?1, ?2)",
                ["entered", "running"],
            )
            .unwrap();

        let err = conn
            .as_conn()
            .execute(
                "INSERT INTO status (status_task, status_mission) VALUES (?1, ?2)",
                ["launched", "running"],
            )
            .unwrap_err();
        assert!(Error::from(err).is_constraint_violation());
    }

    #[test]
    fn test_unknown_table_rejected() {
        let conn = create_temp_db();
        assert!(matches!(
            Schema::count_rows(&conn, "employee_organization"),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn test_dump_table_columns_and_rows() {
        let mut conn = create_temp_db();
        Schema::create(&mut conn).unwrap();
        conn.as_conn()
            .execute(
                "INSERT INTO transport (name, type) VALUES (?1, ?2)",
                ["Sojourner", "Rover"],
            )
            .unwrap();

        let dump = Schema::dump_table(&conn, "transport").unwrap();
        assert_eq!(
            dump.columns,
            vec!["id", "name", "type", "describe", "url_photo"]
        );
        assert_eq!(dump.rows.len(), 1);
        assert_eq!(dump.rows[0][1], Value::Text("Sojourner".to_string()));
        assert_eq!(dump.rows[0][3], Value::Null);

        let json = dump.to_json();
        assert_eq!(json[0]["type"], "Rover");
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&Value::Integer(5100)), "5100");
        assert_eq!(value_to_string(&Value::Text("Tholus".into())), "Tholus");
    }
}
