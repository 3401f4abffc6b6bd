// SQLite-backed submission store, used when no spreadsheet is configured.
//
// Table:
// - submissions: one row per accepted listing, insertion ordered by rowid

use crate::core::submissions::{StoreError, StoreStatus, SubmissionRecord, SubmissionStore};
use crate::infra::sqlite_pool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};

pub struct SqliteSubmissionStore {
    pool: Pool<Sqlite>,
    path: PathBuf,
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn decode_tags(prompt_id: &str, raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!(prompt_id, error = %err, "Corrupt tags cell, listing without tags");
        Vec::new()
    })
}

impl SqliteSubmissionStore {
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = sqlite_pool::open(path).await.map_err(backend)?;
        let store = Self {
            pool,
            path: path.to_path_buf(),
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                prompt_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                prompt TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                premium BOOLEAN NOT NULL DEFAULT 0,
                image_url TEXT,
                wallet TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for SqliteSubmissionStore {
    async fn append(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let tags = serde_json::to_string(&record.tags)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO submissions (prompt_id, title, prompt, tags, premium, image_url, wallet, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.prompt_id)
        .bind(&record.title)
        .bind(&record.prompt)
        .bind(tags)
        .bind(record.premium)
        .bind(&record.image_url)
        .bind(&record.wallet)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT prompt_id, title, prompt, tags, premium, image_url, wallet, created_at
            FROM submissions
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let prompt_id: String = row.get("prompt_id");
            let tags: String = row.get("tags");
            let created_at: String = row.get("created_at");
            records.push(SubmissionRecord {
                tags: decode_tags(&prompt_id, &tags),
                prompt_id,
                title: row.get("title"),
                prompt: row.get("prompt"),
                premium: row.get("premium"),
                image_url: row.get("image_url"),
                wallet: row.get("wallet"),
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(records)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM submissions")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        let total: i64 = row.get("total");

        Ok(StoreStatus {
            backend: "sqlite".to_string(),
            location: self.path.display().to_string(),
            row_count: total as usize,
            available_sheets: Vec::new(),
        })
    }
}
