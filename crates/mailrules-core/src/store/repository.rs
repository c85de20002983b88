//! Email repository backed by `SQLite`.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use super::model::Email;
use crate::Result;

/// Repository for fetched emails.
pub struct EmailRepository {
    pool: SqlitePool,
}

impl EmailRepository {
    /// Connect to the database at `url` (e.g. `sqlite:mailrules.db?mode=rwc`).
    ///
    /// Creates the table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        debug!(url, "opened email store");
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS emails (
                id TEXT PRIMARY KEY,
                sender TEXT NOT NULL DEFAULT '',
                subject TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL DEFAULT '',
                received TIMESTAMP NOT NULL,
                read BOOLEAN NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert an email unless one with the same id is already stored.
    ///
    /// Returns `true` if the row was inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert_if_absent(&self, email: &Email) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO emails (id, sender, subject, message, received, read)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(&email.id)
        .bind(&email.sender)
        .bind(&email.subject)
        .bind(&email.message)
        .bind(email.received)
        .bind(email.read)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get every stored email, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all(&self) -> Result<Vec<Email>> {
        let rows = sqlx::query(
            r"
            SELECT id, sender, subject, message, received, read
            FROM emails
            ORDER BY rowid
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_email).collect::<sqlx::Result<_>>()?)
    }

    /// Get a single email by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: &str) -> Result<Option<Email>> {
        let row = sqlx::query(
            r"
            SELECT id, sender, subject, message, received, read
            FROM emails
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_email).transpose()?)
    }

    /// Number of stored emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM emails")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("total") as usize)
    }

    /// Close all connections.
    pub async fn close(self) {
        self.pool.close().await;
        debug!("closed email store");
    }
}

/// Convert a database row to an `Email`.
fn row_to_email(row: &SqliteRow) -> sqlx::Result<Email> {
    Ok(Email {
        id: row.try_get("id")?,
        sender: row.try_get("sender")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        received: row.try_get("received")?,
        read: row.try_get("read")?,
    })
}
