//! SQLite store
//!
//! Wraps a single rusqlite connection behind an async mutex. Schema text
//! follows the shape SQL-generation prompts work best with: the original
//! `CREATE TABLE` DDL followed by a comment block of sample rows per table.

use crate::store::{SqlStore, StoreError};

#[cfg(feature = "sqlite")]
use rusqlite::types::ValueRef;
#[cfg(feature = "sqlite")]
use rusqlite::Connection;
#[cfg(feature = "sqlite")]
use tokio::sync::Mutex;

/// Sample rows included per table in `table_info`
const SAMPLE_ROWS: usize = 3;

/// SQLite-backed store
pub struct SqliteStore {
    /// Database path, kept for diagnostics
    path: String,

    #[cfg(feature = "sqlite")]
    conn: Mutex<Connection>,

    #[cfg(not(feature = "sqlite"))]
    _phantom: std::marker::PhantomData<()>,
}

impl SqliteStore {
    /// Open a database file (creates it if missing, as SQLite does)
    #[cfg(feature = "sqlite")]
    pub fn open(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        let conn = Connection::open(&path).map_err(|e| {
            StoreError::ConnectionError(format!("Failed to open SQLite db at {}: {}", path, e))
        })?;
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (used by tests and demos)
    #[cfg(feature = "sqlite")]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(Self {
            path: ":memory:".to_string(),
            conn: Mutex::new(conn),
        })
    }

    #[cfg(not(feature = "sqlite"))]
    pub fn open(_path: impl Into<String>) -> Result<Self, StoreError> {
        Err(StoreError::ConfigError(
            "SQLite support not compiled. Rebuild with: cargo build --features sqlite".to_string(),
        ))
    }

    #[cfg(not(feature = "sqlite"))]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Err(StoreError::ConfigError(
            "SQLite support not compiled. Rebuild with: cargo build --features sqlite".to_string(),
        ))
    }

    /// Database path this store was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    #[cfg(feature = "sqlite")]
    fn list_tables(conn: &Connection) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name",
            )
            .map_err(|e| StoreError::IntrospectionError(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::IntrospectionError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::IntrospectionError(e.to_string()))?;
        Ok(names)
    }

    /// Run a query and render header plus rows as tab-separated text
    #[cfg(feature = "sqlite")]
    fn render_query(conn: &Connection, query: &str) -> Result<String, StoreError> {
        let mut stmt = conn
            .prepare(query)
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = column_names.len();

        let mut lines = vec![column_names.join("\t")];
        let mut rows = stmt
            .query([])
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| StoreError::QueryError(e.to_string()))?
        {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| StoreError::QueryError(e.to_string()))?;
                values.push(render_value(value));
            }
            lines.push(values.join("\t"));
        }

        if lines.len() == 1 {
            lines.push("(0 rows)".to_string());
        }
        Ok(lines.join("\n"))
    }
}

/// Render a single SQLite value for textual output
#[cfg(feature = "sqlite")]
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

#[async_trait::async_trait]
impl SqlStore for SqliteStore {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    #[cfg(feature = "sqlite")]
    async fn usable_table_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().await;
        Self::list_tables(&conn)
    }

    #[cfg(feature = "sqlite")]
    async fn table_info(&self) -> Result<String, StoreError> {
        let conn = self.conn.lock().await;
        let tables = Self::list_tables(&conn)?;

        let mut sections = Vec::with_capacity(tables.len());
        for table in &tables {
            let ddl: String = conn
                .query_row(
                    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .map_err(|e| StoreError::IntrospectionError(e.to_string()))?;

            let sample = Self::render_query(
                &conn,
                &format!("SELECT * FROM \"{}\" LIMIT {}", table, SAMPLE_ROWS),
            )?;

            sections.push(format!(
                "{}\n\n/*\n{} rows from {} table:\n{}\n*/",
                ddl, SAMPLE_ROWS, table, sample
            ));
        }
        Ok(sections.join("\n\n"))
    }

    #[cfg(feature = "sqlite")]
    async fn run(&self, query: &str) -> Result<String, StoreError> {
        tracing::debug!(query, "executing sqlite query");
        let conn = self.conn.lock().await;
        Self::render_query(&conn, query)
    }

    #[cfg(feature = "sqlite")]
    async fn test_connection(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StoreError::ConnectionError(format!("Connection test failed: {}", e)))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn usable_table_names(&self) -> Result<Vec<String>, StoreError> {
        Err(disabled())
    }

    #[cfg(not(feature = "sqlite"))]
    async fn table_info(&self) -> Result<String, StoreError> {
        Err(disabled())
    }

    #[cfg(not(feature = "sqlite"))]
    async fn run(&self, _query: &str) -> Result<String, StoreError> {
        Err(disabled())
    }

    #[cfg(not(feature = "sqlite"))]
    async fn test_connection(&self) -> Result<(), StoreError> {
        Err(disabled())
    }
}

#[cfg(not(feature = "sqlite"))]
fn disabled() -> StoreError {
    StoreError::ConfigError(
        "SQLite support not compiled. Rebuild with: cargo build --features sqlite".to_string(),
    )
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn chinook_like_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().await;
            conn.execute_batch(
                "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT);
                 CREATE TABLE Employee (EmployeeId INTEGER PRIMARY KEY, LastName TEXT NOT NULL);
                 INSERT INTO Artist (ArtistId, Name) VALUES (1, 'AC/DC'), (2, 'Accept');
                 INSERT INTO Employee (EmployeeId, LastName) VALUES (1, 'Adams');",
            )
            .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn lists_tables_in_order() {
        let store = chinook_like_store().await;
        let names = store.usable_table_names().await.unwrap();
        assert_eq!(names, vec!["Artist".to_string(), "Employee".to_string()]);
    }

    #[tokio::test]
    async fn table_info_includes_ddl_and_samples() {
        let store = chinook_like_store().await;
        let info = store.table_info().await.unwrap();
        assert!(info.contains("CREATE TABLE Artist"));
        assert!(info.contains("CREATE TABLE Employee"));
        assert!(info.contains("rows from Artist table"));
        assert!(info.contains("AC/DC"));
    }

    #[tokio::test]
    async fn run_renders_header_and_rows() {
        let store = chinook_like_store().await;
        let out = store
            .run("SELECT Name FROM Artist ORDER BY ArtistId")
            .await
            .unwrap();
        assert_eq!(out, "Name\nAC/DC\nAccept");
    }

    #[tokio::test]
    async fn run_renders_empty_result() {
        let store = chinook_like_store().await;
        let out = store
            .run("SELECT Name FROM Artist WHERE ArtistId = 99")
            .await
            .unwrap();
        assert_eq!(out, "Name\n(0 rows)");
    }

    #[tokio::test]
    async fn run_surfaces_sql_errors() {
        let store = chinook_like_store().await;
        let err = store.run("SELECT * FROM NoSuchTable").await.unwrap_err();
        match err {
            StoreError::QueryError(msg) => assert!(msg.contains("NoSuchTable")),
            other => panic!("expected QueryError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_test_passes() {
        let store = chinook_like_store().await;
        store.test_connection().await.unwrap();
    }

    #[tokio::test]
    async fn null_values_render_as_null() {
        let store = chinook_like_store().await;
        {
            let conn = store.conn.lock().await;
            conn.execute("INSERT INTO Artist (ArtistId, Name) VALUES (3, NULL)", [])
                .unwrap();
        }
        let out = store
            .run("SELECT Name FROM Artist WHERE ArtistId = 3")
            .await
            .unwrap();
        assert_eq!(out, "Name\nNULL");
    }
}
