//! Applicant Store: optional SQLite sink for parsed resumes.
//!
//! Rows are matched on email or phone so re-scanning the same candidate updates
//! the existing row instead of adding a duplicate.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::applicant::ApplicantRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
}

pub struct ApplicantStore {
    pool: SqlitePool,
}

impl ApplicantStore {
    /// Opens (creating if needed) the database at `url` and ensures the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };

        debug!("Connecting to applicant store: {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_tables().await?;
        info!("Applicant store ready");
        Ok(store)
    }

    async fn init_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                applicant_id TEXT NOT NULL,
                source TEXT NOT NULL,
                name TEXT,
                email TEXT,
                phone TEXT,
                skills TEXT,
                experience TEXT,
                score REAL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_resumes_email ON resumes(email)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_resumes_phone ON resumes(phone)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upserts a record. An existing row keeps any value the new record lacks,
    /// and its email is only filled if it had none.
    pub async fn save(
        &self,
        record: &ApplicantRecord,
        score: Option<f64>,
    ) -> Result<SaveOutcome, StoreError> {
        let email = record.contact.email.as_deref();
        let phone = record.contact.phone.as_deref();
        let skills = record.skills_csv();
        let source = record.source.display().to_string();

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM resumes WHERE email = ? OR phone = ? ORDER BY id LIMIT 1")
                .bind(email)
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE resumes SET
                        applicant_id = ?,
                        source = ?,
                        name = COALESCE(?, name),
                        email = COALESCE(email, ?),
                        phone = COALESCE(phone, ?),
                        skills = COALESCE(?, skills),
                        experience = COALESCE(?, experience),
                        score = COALESCE(?, score),
                        updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                    "#,
                )
                .bind(record.applicant_id.to_string())
                .bind(&source)
                .bind(&record.name)
                .bind(email)
                .bind(phone)
                .bind(&skills)
                .bind(&record.experience_summary)
                .bind(score)
                .bind(id)
                .execute(&self.pool)
                .await?;
                debug!("Updated resume row {} from {}", id, source);
                Ok(SaveOutcome::Updated)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO resumes (
                        applicant_id, source, name, email, phone, skills, experience, score, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
                    "#,
                )
                .bind(record.applicant_id.to_string())
                .bind(&source)
                .bind(&record.name)
                .bind(email)
                .bind(phone)
                .bind(&skills)
                .bind(&record.experience_summary)
                .bind(score)
                .execute(&self.pool)
                .await?;
                debug!("Inserted resume row from {}", source);
                Ok(SaveOutcome::Inserted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::applicant::ApplicantId;
    use std::path::PathBuf;

    fn record(content: &str, email: Option<&str>, phone: Option<&str>) -> ApplicantRecord {
        let mut record = ApplicantRecord::new(
            ApplicantId::from_content(content.as_bytes()),
            PathBuf::from(format!("{content}.txt")),
        );
        record.contact.email = email.map(str::to_string);
        record.contact.phone = phone.map(str::to_string);
        record
    }

    async fn row_count(store: &ApplicantStore) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resumes")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_insert_then_update_by_email() {
        let store = ApplicantStore::connect("sqlite::memory:").await.unwrap();

        let mut first = record("a", Some("jane@example.com"), None);
        first.name = Some("Jane Doe".to_string());
        assert_eq!(store.save(&first, Some(0.5)).await.unwrap(), SaveOutcome::Inserted);

        let mut second = record("b", Some("jane@example.com"), Some("+1 555 123 4567"));
        second.skills.insert("Rust".to_string());
        assert_eq!(store.save(&second, None).await.unwrap(), SaveOutcome::Updated);
        assert_eq!(row_count(&store).await, 1);

        let (name, phone, skills, score): (Option<String>, Option<String>, Option<String>, Option<f64>) =
            sqlx::query_as("SELECT name, phone, skills, score FROM resumes")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        // Values missing from the second record are kept from the first.
        assert_eq!(name.as_deref(), Some("Jane Doe"));
        assert_eq!(phone.as_deref(), Some("+1 555 123 4567"));
        assert_eq!(skills.as_deref(), Some("Rust"));
        assert_eq!(score, Some(0.5));
    }

    #[tokio::test]
    async fn test_match_by_phone_fills_missing_email() {
        let store = ApplicantStore::connect("sqlite::memory:").await.unwrap();
        store.save(&record("a", None, Some("555-0100-123")), None).await.unwrap();

        let outcome = store
            .save(&record("b", Some("new@example.com"), Some("555-0100-123")), None)
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Updated);

        let (email,): (Option<String>,) = sqlx::query_as("SELECT email FROM resumes")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(email.as_deref(), Some("new@example.com"));
    }

    #[tokio::test]
    async fn test_existing_email_is_never_replaced() {
        let store = ApplicantStore::connect("sqlite::memory:").await.unwrap();
        store
            .save(&record("a", Some("old@example.com"), Some("555 0100 123")), None)
            .await
            .unwrap();
        store
            .save(&record("b", Some("other@example.com"), Some("555 0100 123")), None)
            .await
            .unwrap();

        let (email,): (Option<String>,) = sqlx::query_as("SELECT email FROM resumes")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(email.as_deref(), Some("old@example.com"));
    }

    #[tokio::test]
    async fn test_records_without_contact_are_always_inserted() {
        let store = ApplicantStore::connect("sqlite::memory:").await.unwrap();
        store.save(&record("a", None, None), None).await.unwrap();
        store.save(&record("b", None, None), None).await.unwrap();
        assert_eq!(row_count(&store).await, 2);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ats.db").display());
        let store = ApplicantStore::connect(&url).await.unwrap();
        store.save(&record("a", Some("a@example.com"), None), Some(1.0)).await.unwrap();
        assert!(dir.path().join("ats.db").exists());
    }
}
