//! PostgreSQL store using information_schema
//!
//! Schema text is reconstructed from information_schema.columns as
//! `CREATE TABLE` style blocks, which is what SQL-generation prompts
//! expect. Queries are executed over the simple-query protocol so rows
//! come back as text regardless of column types.

use crate::store::{SqlStore, StoreError};
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

/// PostgreSQL-backed store
pub struct PostgresStore {
    client: Client,
    database: String,
}

impl PostgresStore {
    /// Connect using a PostgreSQL connection string, e.g.
    /// `host=localhost port=5432 dbname=chinook user=askdb password=...`
    pub async fn connect(conn_str: &str) -> Result<Self, StoreError> {
        let config: tokio_postgres::Config = conn_str
            .parse()
            .map_err(|e| StoreError::ConfigError(format!("Invalid connection string: {}", e)))?;
        let database = config.get_dbname().unwrap_or("postgres").to_string();

        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| StoreError::ConnectionError(format!("Failed to connect: {}", e)))?;

        // Drive the connection in the background for the life of the store
        let db = database.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error ({}): {}", db, e);
            }
        });

        Ok(Self { client, database })
    }

    /// Database name this store is connected to
    pub fn database(&self) -> &str {
        &self.database
    }
}

#[async_trait::async_trait]
impl SqlStore for PostgresStore {
    fn dialect(&self) -> &str {
        "postgresql"
    }

    async fn usable_table_names(&self) -> Result<Vec<String>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[],
            )
            .await
            .map_err(|e| StoreError::IntrospectionError(e.to_string()))?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn table_info(&self) -> Result<String, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT table_name, column_name, data_type, is_nullable \
                 FROM information_schema.columns \
                 WHERE table_schema = 'public' \
                 ORDER BY table_name, ordinal_position",
                &[],
            )
            .await
            .map_err(|e| StoreError::IntrospectionError(e.to_string()))?;

        let mut sections: Vec<String> = Vec::new();
        let mut current_table: Option<String> = None;
        let mut columns: Vec<String> = Vec::new();

        let mut flush = |table: &Option<String>, columns: &mut Vec<String>, out: &mut Vec<String>| {
            if let Some(name) = table {
                out.push(format!(
                    "CREATE TABLE \"{}\" (\n{}\n)",
                    name,
                    columns.join(",\n")
                ));
                columns.clear();
            }
        };

        for row in &rows {
            let table: String = row.get(0);
            let column: String = row.get(1);
            let data_type: String = row.get(2);
            let is_nullable: String = row.get(3);

            if current_table.as_deref() != Some(table.as_str()) {
                flush(&current_table, &mut columns, &mut sections);
                current_table = Some(table);
            }

            let not_null = if is_nullable.eq_ignore_ascii_case("NO") {
                " NOT NULL"
            } else {
                ""
            };
            columns.push(format!("\t\"{}\" {}{}", column, data_type, not_null));
        }
        flush(&current_table, &mut columns, &mut sections);

        Ok(sections.join("\n\n"))
    }

    async fn run(&self, query: &str) -> Result<String, StoreError> {
        tracing::debug!(query, "executing postgres query");
        let messages = self
            .client
            .simple_query(query)
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))?;

        let mut lines: Vec<String> = Vec::new();
        for message in &messages {
            if let SimpleQueryMessage::Row(row) = message {
                if lines.is_empty() {
                    let header: Vec<&str> =
                        row.columns().iter().map(|c| c.name()).collect();
                    lines.push(header.join("\t"));
                }
                let values: Vec<String> = (0..row.len())
                    .map(|i| row.get(i).unwrap_or("NULL").to_string())
                    .collect();
                lines.push(values.join("\t"));
            }
        }

        if lines.is_empty() {
            return Ok("(0 rows)".to_string());
        }
        Ok(lines.join("\n"))
    }

    async fn test_connection(&self) -> Result<(), StoreError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| StoreError::ConnectionError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }
}
