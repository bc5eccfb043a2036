//! Store trait for schema inspection and query execution

/// Errors that can occur when talking to the database
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Schema introspection failed: {0}")]
    IntrospectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for stores the pipeline can question.
///
/// The pipeline consumes exactly this surface: dialect and schema text to
/// ground the SQL-generation prompt, and `run` to execute whatever the
/// model produced. Generated SQL is executed as-is; there is no allow-list
/// or read-only enforcement past this point.
#[async_trait::async_trait]
pub trait SqlStore: Send + Sync {
    /// SQL dialect name as used in prompts (e.g. "sqlite", "postgresql")
    fn dialect(&self) -> &str;

    /// Names of the tables a generated query may reference, in a stable order
    async fn usable_table_names(&self) -> Result<Vec<String>, StoreError>;

    /// Free-text description of table structures (columns, types, sample
    /// rows), embedded verbatim into the SQL-generation prompt
    async fn table_info(&self) -> Result<String, StoreError>;

    /// Execute a query and return its rows rendered as text.
    ///
    /// Errors are returned to the caller; the pipeline chooses to treat
    /// them as data rather than failures.
    async fn run(&self, query: &str) -> Result<String, StoreError>;

    /// Issue a trivial query to validate the connection at startup
    async fn test_connection(&self) -> Result<(), StoreError>;
}
