//! Offline mutation queue
//!
//! Writes made while offline are stored in SQLite and replayed in the order
//! they were made once connectivity returns. A replay run stops at the first
//! failing mutation so that later writes never overtake earlier ones; a
//! mutation that keeps failing is dropped after `max_attempts`, and one the
//! backend rejects outright is dropped at once.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{MutationId, PortError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Row;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::CacheError;
use crate::network::NetworkMonitor;
use crate::pool::CachePool;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A stored write awaiting replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub id: MutationId,
    pub kind: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Applies a pending mutation against the backend
#[async_trait]
pub trait MutationExecutor: Send + Sync {
    async fn execute(&self, mutation: &PendingMutation) -> Result<(), PortError>;
}

/// Outcome of one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Replayed successfully and removed
    pub applied: usize,
    /// Failed and kept for the next run
    pub failed: usize,
    /// Removed without being applied
    pub dropped: usize,
    /// Not attempted in this run
    pub skipped: usize,
}

#[derive(Debug)]
pub struct MutationQueue {
    pool: CachePool,
    max_attempts: u32,
    replay_lock: Mutex<()>,
}

impl MutationQueue {
    pub fn new(pool: CachePool) -> Self {
        Self {
            pool,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            replay_lock: Mutex::new(()),
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Stores a mutation for later replay
    pub async fn enqueue(&self, kind: impl Into<String>, payload: Value) -> Result<MutationId, CacheError> {
        let id = MutationId::new_v7();
        let kind = kind.into();

        sqlx::query(
            "INSERT INTO pending_mutations (id, kind, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id.to_string())
        .bind(&kind)
        .bind(serde_json::to_string(&payload)?)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!(mutation_id = %id, kind = %kind, "Queued offline mutation");
        Ok(id)
    }

    /// Pending mutations, oldest first
    pub async fn pending(&self) -> Result<Vec<PendingMutation>, CacheError> {
        let rows = sqlx::query(
            "SELECT id, kind, payload, created_at, attempts, last_error FROM pending_mutations ORDER BY created_at, seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PendingMutation, CacheError> {
                let id: String = row.try_get("id")?;
                let payload: String = row.try_get("payload")?;
                let created_at: i64 = row.try_get("created_at")?;
                let attempts: i64 = row.try_get("attempts")?;
                Ok(PendingMutation {
                    id: id
                        .parse()
                        .map_err(|e| CacheError::Serialization(format!("bad mutation id: {}", e)))?,
                    kind: row.try_get("kind")?,
                    payload: serde_json::from_str(&payload)?,
                    created_at: Utc
                        .timestamp_millis_opt(created_at)
                        .single()
                        .ok_or_else(|| CacheError::Serialization(format!("invalid timestamp {}", created_at)))?,
                    attempts: attempts.max(0) as u32,
                    last_error: row.try_get("last_error")?,
                })
            })
            .collect()
    }

    pub async fn len(&self) -> Result<usize, CacheError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_mutations")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }

    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }

    async fn remove(&self, id: &MutationId) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM pending_mutations WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_failure(&self, id: &MutationId, attempts: u32, message: &str) -> Result<(), CacheError> {
        sqlx::query("UPDATE pending_mutations SET attempts = ?1, last_error = ?2 WHERE id = ?3")
            .bind(attempts as i64)
            .bind(message)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replays pending mutations in order
    ///
    /// Offline, nothing is attempted. A failure keeps the mutation and ends
    /// the run unless it has now used up `max_attempts`, in which case it is
    /// dropped and the run continues. A payload the backend rejects
    /// (`Validation`, `Transformation`) is dropped immediately. `Unauthorized`
    /// ends the run without counting an attempt: the write waits for a fresh
    /// session.
    pub async fn replay(
        &self,
        executor: &dyn MutationExecutor,
        network: &NetworkMonitor,
    ) -> Result<SyncReport, CacheError> {
        let _guard = self.replay_lock.lock().await;
        let pending = self.pending().await?;
        let mut report = SyncReport::default();

        if !network.is_online() {
            report.skipped = pending.len();
            debug!(skipped = report.skipped, "Offline, replay skipped");
            return Ok(report);
        }

        let total = pending.len();
        for (index, mutation) in pending.into_iter().enumerate() {
            match executor.execute(&mutation).await {
                Ok(()) => {
                    self.remove(&mutation.id).await?;
                    report.applied += 1;
                }
                Err(e) if is_rejection(&e) => {
                    error!(mutation_id = %mutation.id, kind = %mutation.kind, error = %e, "Dropping rejected mutation");
                    self.remove(&mutation.id).await?;
                    report.dropped += 1;
                }
                Err(e @ PortError::Unauthorized { .. }) => {
                    warn!(mutation_id = %mutation.id, error = %e, "Session rejected, stopping replay");
                    self.record_failure(&mutation.id, mutation.attempts, &e.to_string()).await?;
                    report.failed += 1;
                    report.skipped = total - index - 1;
                    break;
                }
                Err(e) => {
                    let attempts = mutation.attempts + 1;
                    if attempts >= self.max_attempts {
                        error!(
                            mutation_id = %mutation.id,
                            kind = %mutation.kind,
                            attempts,
                            error = %e,
                            "Dropping mutation after repeated failures"
                        );
                        self.remove(&mutation.id).await?;
                        report.dropped += 1;
                        continue;
                    }

                    warn!(mutation_id = %mutation.id, attempts, error = %e, "Mutation failed, stopping replay");
                    self.record_failure(&mutation.id, attempts, &e.to_string()).await?;
                    report.failed += 1;
                    report.skipped = total - index - 1;
                    break;
                }
            }
        }

        info!(
            applied = report.applied,
            failed = report.failed,
            dropped = report.dropped,
            skipped = report.skipped,
            "Offline mutations replayed"
        );
        Ok(report)
    }
}

/// Replays the queue each time the monitor reports a change while online
///
/// A `watch` receiver only sees the latest state, so an offline/online flap
/// between two polls looks like no transition at all. Any observed change
/// that leaves the monitor online triggers a run; `replay` serializes runs.
/// The task holds its own monitor handle, so it runs until aborted.
pub fn spawn_sync_on_reconnect(
    queue: Arc<MutationQueue>,
    network: NetworkMonitor,
    executor: Arc<dyn MutationExecutor>,
) -> JoinHandle<()> {
    let mut rx = network.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if !rx.borrow_and_update().online {
                continue;
            }
            info!("Network restored, replaying offline mutations");
            if let Err(e) = queue.replay(executor.as_ref(), &network).await {
                error!(error = %e, "Offline mutation replay failed");
            }
        }
    })
}

/// The backend refused the payload itself; retrying cannot help
fn is_rejection(error: &PortError) -> bool {
    matches!(
        error,
        PortError::Validation { .. } | PortError::Transformation { .. }
    )
}
