//! Mock store for testing
//!
//! Returns predefined schema text and query results without touching a
//! real database. Useful for unit testing the pipeline, asserting prompt
//! content, and simulating execution failures deterministically.
//!
//! ```rust,ignore
//! let store = MockStore::builder()
//!     .with_dialect("sqlite")
//!     .with_table("Employee")
//!     .with_table_info("CREATE TABLE Employee (EmployeeId INTEGER, LastName TEXT)")
//!     .with_result("SELECT COUNT(EmployeeId) FROM Employee", "count\n8")
//!     .build();
//! ```

use crate::store::{SqlStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store double
pub struct MockStore {
    dialect: String,
    tables: Vec<String>,
    table_info: String,

    /// Canned results keyed by exact query text
    results: HashMap<String, String>,

    /// Errors keyed by exact query text
    errors: HashMap<String, StoreError>,

    /// Result returned for queries with no canned entry
    default_result: String,

    fail_connection: bool,

    /// Every query passed to `run`, in call order
    executed: Arc<RwLock<Vec<String>>>,
}

impl MockStore {
    pub fn builder() -> MockStoreBuilder {
        MockStoreBuilder::new()
    }

    /// Queries executed so far, in order
    pub async fn executed_queries(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }
}

impl Clone for MockStore {
    fn clone(&self) -> Self {
        Self {
            dialect: self.dialect.clone(),
            tables: self.tables.clone(),
            table_info: self.table_info.clone(),
            results: self.results.clone(),
            errors: self.errors.clone(),
            default_result: self.default_result.clone(),
            fail_connection: self.fail_connection,
            executed: Arc::clone(&self.executed),
        }
    }
}

#[async_trait::async_trait]
impl SqlStore for MockStore {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    async fn usable_table_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tables.clone())
    }

    async fn table_info(&self) -> Result<String, StoreError> {
        Ok(self.table_info.clone())
    }

    async fn run(&self, query: &str) -> Result<String, StoreError> {
        self.executed.write().await.push(query.to_string());

        if let Some(error) = self.errors.get(query) {
            return Err(error.clone());
        }
        Ok(self
            .results
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default_result.clone()))
    }

    async fn test_connection(&self) -> Result<(), StoreError> {
        if self.fail_connection {
            Err(StoreError::ConnectionError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Fluent builder for [`MockStore`]
pub struct MockStoreBuilder {
    dialect: String,
    tables: Vec<String>,
    table_info: String,
    results: HashMap<String, String>,
    errors: HashMap<String, StoreError>,
    default_result: String,
    fail_connection: bool,
}

impl MockStoreBuilder {
    pub fn new() -> Self {
        Self {
            dialect: "sqlite".to_string(),
            tables: Vec::new(),
            table_info: String::new(),
            results: HashMap::new(),
            errors: HashMap::new(),
            default_result: "(0 rows)".to_string(),
            fail_connection: false,
        }
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn with_table(mut self, name: impl Into<String>) -> Self {
        self.tables.push(name.into());
        self
    }

    pub fn with_table_info(mut self, info: impl Into<String>) -> Self {
        self.table_info = info.into();
        self
    }

    /// Canned result for an exact query string
    pub fn with_result(mut self, query: impl Into<String>, result: impl Into<String>) -> Self {
        self.results.insert(query.into(), result.into());
        self
    }

    /// Result returned when no canned entry matches
    pub fn with_default_result(mut self, result: impl Into<String>) -> Self {
        self.default_result = result.into();
        self
    }

    /// Error returned for an exact query string
    pub fn with_error(mut self, query: impl Into<String>, error: StoreError) -> Self {
        self.errors.insert(query.into(), error);
        self
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn build(self) -> MockStore {
        MockStore {
            dialect: self.dialect,
            tables: self.tables,
            table_info: self.table_info,
            results: self.results,
            errors: self.errors,
            default_result: self.default_result,
            fail_connection: self.fail_connection,
            executed: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn canned_result_and_recording() {
        let store = MockStore::builder()
            .with_table("Employee")
            .with_result("SELECT 1", "1\n1")
            .build();

        assert_eq!(store.run("SELECT 1").await.unwrap(), "1\n1");
        assert_eq!(store.run("SELECT 2").await.unwrap(), "(0 rows)");
        assert_eq!(
            store.executed_queries().await,
            vec!["SELECT 1".to_string(), "SELECT 2".to_string()]
        );
    }

    #[tokio::test]
    async fn error_injection() {
        let store = MockStore::builder()
            .with_error(
                "SELECT * FROM Missing",
                StoreError::QueryError("no such table: Missing".to_string()),
            )
            .build();

        let err = store.run("SELECT * FROM Missing").await.unwrap_err();
        assert!(matches!(err, StoreError::QueryError(_)));
        // the failing query is still recorded
        assert_eq!(store.executed_queries().await.len(), 1);
    }

    #[tokio::test]
    async fn connection_failure() {
        let store = MockStore::builder().with_connection_failure().build();
        assert!(store.test_connection().await.is_err());

        let store = MockStore::builder().build();
        assert!(store.test_connection().await.is_ok());
    }

    #[tokio::test]
    async fn schema_surface() {
        let store = MockStore::builder()
            .with_dialect("postgresql")
            .with_table("Artist")
            .with_table("Employee")
            .with_table_info("CREATE TABLE Artist (ArtistId INTEGER)")
            .build();

        assert_eq!(store.dialect(), "postgresql");
        assert_eq!(
            store.usable_table_names().await.unwrap(),
            vec!["Artist".to_string(), "Employee".to_string()]
        );
        assert!(store.table_info().await.unwrap().contains("CREATE TABLE"));
    }
}
