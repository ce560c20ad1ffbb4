use anyhow::{Context, Result, bail};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Returns true for plain SQL identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// SQLite trade history store
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens an existing store without write access. Never creates the file.
    pub async fn open_read_only(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database {:?}", path))?;

        info!("Connected to database (read-only): {:?}", path);
        Ok(Self { pool })
    }

    /// Opens the store read-write, creating the file and the training table if needed.
    pub async fn open_or_create(path: &Path, table: &str, label: &str) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database {:?}", path))?;

        info!("Connected to database: {:?}", path);

        let db = Self { pool };
        db.init(table, label).await?;

        Ok(db)
    }

    /// Initialize the training data table
    async fn init(&self, table: &str, label: &str) -> Result<()> {
        if !is_valid_identifier(table) || !is_valid_identifier(label) {
            bail!("Invalid table or label identifier: {}.{}", table, label);
        }

        let mut conn = self.pool.acquire().await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                slippage REAL NOT NULL,
                gas_price REAL NOT NULL,
                volatility REAL NOT NULL,
                {label} REAL NOT NULL,
                timestamp INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_timestamp
            ON {table} (timestamp);
            "#
        ))
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to create {} table", table))?;

        info!("Database schema initialized.");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("ai_training_data"));
        assert!(is_valid_identifier("_profit2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("profit; DROP TABLE x"));
        assert!(!is_valid_identifier("gas-price"));
    }
}
