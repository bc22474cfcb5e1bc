//! On-disk query store
//!
//! Per-key rows in SQLite, written through on every cache write so that
//! results too large or too numerous for the key-value blob remain
//! available offline.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

use crate::error::CacheError;
use crate::key::QueryKey;
use crate::policy::{CacheEntry, CachePolicy, DataCategory};
use crate::pool::CachePool;

#[derive(Debug, Clone)]
pub struct DiskStore {
    pool: CachePool,
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, CacheError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| CacheError::Serialization(format!("invalid timestamp {}", ms)))
}

fn row_to_entry(row: &SqliteRow) -> Result<CacheEntry, CacheError> {
    let segments: String = row.try_get("segments")?;
    let category: String = row.try_get("category")?;
    let data: String = row.try_get("data")?;
    let updated_at: i64 = row.try_get("updated_at")?;
    let invalidated: bool = row.try_get("invalidated")?;

    Ok(CacheEntry {
        key: serde_json::from_str(&segments)?,
        category: category.parse().map_err(CacheError::Serialization)?,
        data: serde_json::from_str(&data)?,
        updated_at: from_millis(updated_at)?,
        invalidated,
    })
}

impl DiskStore {
    pub fn new(pool: CachePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &CachePool {
        &self.pool
    }

    /// Inserts or replaces an entry
    pub async fn put(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO query_cache (key, segments, category, data, updated_at, invalidated)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(key) DO UPDATE SET
                segments = excluded.segments,
                category = excluded.category,
                data = excluded.data,
                updated_at = excluded.updated_at,
                invalidated = excluded.invalidated
            "#,
        )
        .bind(entry.key.identity())
        .bind(serde_json::to_string(&entry.key)?)
        .bind(entry.category.as_str())
        .bind(serde_json::to_string(&entry.data)?)
        .bind(to_millis(entry.updated_at))
        .bind(entry.invalidated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, key: &QueryKey) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query(
            "SELECT segments, category, data, updated_at, invalidated FROM query_cache WHERE key = ?1",
        )
        .bind(key.identity())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    pub async fn remove(&self, key: &QueryKey) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM query_cache WHERE key = ?1")
            .bind(key.identity())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks every entry under `prefix` as invalidated
    ///
    /// Matching is done on the identity text: a key is under `["a"]` if it
    /// equals `["a"]` or starts with `["a",`.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> Result<u64, CacheError> {
        let result = if prefix.segments().is_empty() {
            sqlx::query("UPDATE query_cache SET invalidated = 1")
                .execute(&self.pool)
                .await?
        } else {
            let exact = prefix.identity();
            let open = format!("{},", &exact[..exact.len() - 1]);
            sqlx::query(
                "UPDATE query_cache SET invalidated = 1 WHERE key = ?1 OR substr(key, 1, ?2) = ?3",
            )
            .bind(&exact)
            .bind(open.chars().count() as i64)
            .bind(&open)
            .execute(&self.pool)
            .await?
        };
        Ok(result.rows_affected())
    }

    /// Deletes entries older than their category's gc time
    pub async fn delete_expired<F>(&self, now: DateTime<Utc>, policy_for: F) -> Result<u64, CacheError>
    where
        F: Fn(DataCategory) -> CachePolicy,
    {
        let mut removed = 0;
        for category in DataCategory::ALL {
            let cutoff = now - policy_for(category).gc_time;
            let result = sqlx::query("DELETE FROM query_cache WHERE category = ?1 AND updated_at <= ?2")
                .bind(category.as_str())
                .bind(to_millis(cutoff))
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }
        if removed > 0 {
            debug!(removed, "Deleted expired cache rows");
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM query_cache").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn len(&self) -> Result<u64, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM query_cache")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, CacheDbConfig};
    use chrono::Duration;
    use serde_json::json;

    async fn store() -> DiskStore {
        DiskStore::new(create_pool(CacheDbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_put_get_replace() {
        let store = store().await;
        let key = QueryKey::from_segments(["companies"]).with(7);
        let now = Utc::now();

        store.put(&CacheEntry::new(key.clone(), json!({"name": "Acme"}), now)).await.unwrap();
        store.put(&CacheEntry::new(key.clone(), json!({"name": "Acme Ltd"}), now)).await.unwrap();

        let entry = store.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.data["name"], "Acme Ltd");
        assert_eq!(entry.category, DataCategory::Reference);
        assert_eq!(entry.updated_at.timestamp_millis(), now.timestamp_millis());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_respects_segment_boundaries() {
        let store = store().await;
        let now = Utc::now();
        for key in [
            QueryKey::from_segments(["companies"]),
            QueryKey::from_segments(["companies", "acme"]),
            QueryKey::from_segments(["companies-archive"]),
        ] {
            store.put(&CacheEntry::new(key, json!(null), now)).await.unwrap();
        }

        let touched = store
            .invalidate_prefix(&QueryKey::from_segments(["companies"]))
            .await
            .unwrap();

        assert_eq!(touched, 2);
        let archive = store
            .get(&QueryKey::from_segments(["companies-archive"]))
            .await
            .unwrap()
            .unwrap();
        assert!(!archive.invalidated);
    }

    #[tokio::test]
    async fn test_delete_expired_uses_category_policy() {
        let store = store().await;
        let now = Utc::now();
        let old = now - Duration::hours(1);
        store.put(&CacheEntry::new(QueryKey::from_segments(["notifications"]), json!([]), old)).await.unwrap();
        store.put(&CacheEntry::new(QueryKey::from_segments(["companies"]), json!([]), old)).await.unwrap();

        let removed = store.delete_expired(now, |c| c.default_policy()).await.unwrap();

        assert_eq!(removed, 1);
        assert!(store.get(&QueryKey::from_segments(["notifications"])).await.unwrap().is_none());
        assert!(store.get(&QueryKey::from_segments(["companies"])).await.unwrap().is_some());
    }
}
