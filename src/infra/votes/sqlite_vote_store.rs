// SQLite-backed vote store.
//
// Table:
// - votes: one row per spent nullifier; the primary key makes reuse a no-op

use crate::core::votes::{Vote, VoteError, VoteStore, VoteTally};
use crate::infra::sqlite_pool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::path::Path;

pub struct SqliteVoteStore {
    pool: Pool<Sqlite>,
}

fn storage(err: sqlx::Error) -> VoteError {
    VoteError::StorageError(err.to_string())
}

impl SqliteVoteStore {
    pub async fn open(path: &Path) -> Result<Self, VoteError> {
        let pool = sqlite_pool::open(path).await.map_err(storage)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), VoteError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                nullifier_hash TEXT PRIMARY KEY,
                prompt_id TEXT NOT NULL,
                is_upvote BOOLEAN NOT NULL,
                voter TEXT,
                proof TEXT,
                cast_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_votes_prompt ON votes(prompt_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl VoteStore for SqliteVoteStore {
    async fn record_vote(&self, vote: &Vote) -> Result<bool, VoteError> {
        let result = sqlx::query(
            r#"
            INSERT INTO votes (nullifier_hash, prompt_id, is_upvote, voter, proof, cast_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(nullifier_hash) DO NOTHING
            "#,
        )
        .bind(&vote.nullifier_hash)
        .bind(&vote.prompt_id)
        .bind(vote.is_upvote)
        .bind(&vote.voter)
        .bind(&vote.proof)
        .bind(vote.cast_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(result.rows_affected() == 1)
    }

    async fn tallies(&self) -> Result<HashMap<String, VoteTally>, VoteError> {
        let rows = sqlx::query(
            r#"
            SELECT prompt_id,
                   SUM(CASE WHEN is_upvote THEN 1 ELSE 0 END) AS upvotes,
                   SUM(CASE WHEN is_upvote THEN 0 ELSE 1 END) AS downvotes
            FROM votes
            GROUP BY prompt_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut tallies: HashMap<String, VoteTally> = HashMap::new();
        for row in rows {
            let upvotes: i64 = row.get("upvotes");
            let downvotes: i64 = row.get("downvotes");
            tallies.insert(
                row.get("prompt_id"),
                VoteTally {
                    upvotes: upvotes as u64,
                    downvotes: downvotes as u64,
                },
            );
        }
        Ok(tallies)
    }

    async fn recent_votes(&self, limit: usize) -> Result<Vec<Vote>, VoteError> {
        let rows = sqlx::query(
            r#"
            SELECT nullifier_hash, prompt_id, is_upvote, voter, proof, cast_at
            FROM votes
            ORDER BY cast_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut votes = Vec::with_capacity(rows.len());
        for row in rows {
            let cast_at: String = row.get("cast_at");
            votes.push(Vote {
                nullifier_hash: row.get("nullifier_hash"),
                prompt_id: row.get("prompt_id"),
                is_upvote: row.get("is_upvote"),
                voter: row.get("voter"),
                proof: row.get("proof"),
                cast_at: DateTime::parse_from_rfc3339(&cast_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vote(prompt_id: &str, nullifier: &str, up: bool, minute: u32) -> Vote {
        Vote {
            prompt_id: prompt_id.to_string(),
            nullifier_hash: nullifier.to_string(),
            is_upvote: up,
            voter: Some("0xvoter".to_string()),
            proof: None,
            cast_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    async fn store() -> (tempfile::TempDir, SqliteVoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVoteStore::open(&dir.path().join("votes.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_nullifier_is_unique() {
        let (_dir, store) = store().await;

        assert!(store.record_vote(&vote("a", "n1", true, 0)).await.unwrap());
        assert!(!store.record_vote(&vote("b", "n1", false, 1)).await.unwrap());

        let tallies = store.tallies().await.unwrap();
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies["a"].upvotes, 1);
    }

    #[tokio::test]
    async fn test_tallies_per_prompt() {
        let (_dir, store) = store().await;

        store.record_vote(&vote("a", "n1", true, 0)).await.unwrap();
        store.record_vote(&vote("a", "n2", false, 1)).await.unwrap();
        store.record_vote(&vote("a", "n3", true, 2)).await.unwrap();
        store.record_vote(&vote("b", "n4", false, 3)).await.unwrap();

        let tallies = store.tallies().await.unwrap();
        assert_eq!(
            tallies["a"],
            VoteTally {
                upvotes: 2,
                downvotes: 1
            }
        );
        assert_eq!(tallies["b"].score(), -1);
    }

    #[tokio::test]
    async fn test_recent_votes_round_trip_fields() {
        let (_dir, store) = store().await;

        store.record_vote(&vote("a", "n1", true, 5)).await.unwrap();
        store.record_vote(&vote("a", "n2", false, 9)).await.unwrap();

        let recent = store.recent_votes(1).await.unwrap();
        assert_eq!(recent, vec![vote("a", "n2", false, 9)]);
    }
}
