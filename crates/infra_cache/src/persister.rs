//! Query persister
//!
//! Keeps the live query cache in memory, snapshots it into a versioned blob
//! in the synchronous key-value tier, and writes every result through to the
//! SQLite store. On startup `restore` hydrates memory from the blob; reads
//! that miss memory fall back to SQLite.
//!
//! # Freshness
//!
//! Each entry carries the time it was written. Its category decides when it
//! becomes stale (served, but refetched when online) and when it expires
//! (dropped). While offline, stale data is served rather than failing.

use chrono::{DateTime, Duration, Utc};
use core_kernel::PortError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::disk::DiskStore;
use crate::error::CacheError;
use crate::key::QueryKey;
use crate::kv::KvStorage;
use crate::network::NetworkMonitor;
use crate::policy::{CacheEntry, CachePolicy, DataCategory};
use crate::pool::CachePool;

/// Version stamp of the persisted blob; bump to discard old snapshots
pub const CACHE_VERSION: &str = "open-crm-cache-v1";

/// Key of the persisted blob in the key-value tier
pub const PERSIST_KEY: &str = "open-crm-query-cache";

/// Persister settings
#[derive(Debug, Clone)]
pub struct PersisterConfig {
    /// Snapshots with a different buster are discarded on restore
    pub buster: String,
    /// Snapshots older than this are discarded on restore
    pub max_age: Duration,
    /// Per-category policy overrides
    pub policies: HashMap<DataCategory, CachePolicy>,
}

impl PersisterConfig {
    pub fn buster(mut self, buster: impl Into<String>) -> Self {
        self.buster = buster.into();
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn policy(mut self, category: DataCategory, policy: CachePolicy) -> Self {
        self.policies.insert(category, policy);
        self
    }

    pub fn policy_for(&self, category: DataCategory) -> CachePolicy {
        self.policies
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_policy())
    }
}

impl Default for PersisterConfig {
    fn default() -> Self {
        Self {
            buster: CACHE_VERSION.to_string(),
            max_age: Duration::hours(24),
            policies: HashMap::new(),
        }
    }
}

/// The blob stored in the key-value tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedClient {
    pub buster: String,
    pub timestamp: DateTime<Utc>,
    pub entries: Vec<CacheEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Memory,
    Disk,
    Network,
}

/// Result of a cache read
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub data: Value,
    pub stale: bool,
    pub source: CacheSource,
}

/// Entries removed by a garbage-collection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcReport {
    pub memory: usize,
    pub disk: u64,
}

pub struct QueryPersister {
    config: PersisterConfig,
    memory: RwLock<HashMap<String, CacheEntry>>,
    kv: Arc<dyn KvStorage>,
    disk: DiskStore,
    network: NetworkMonitor,
    clock: Arc<dyn Clock>,
}

impl QueryPersister {
    pub fn new(
        config: PersisterConfig,
        kv: Arc<dyn KvStorage>,
        pool: CachePool,
        network: NetworkMonitor,
    ) -> Self {
        Self {
            config,
            memory: RwLock::new(HashMap::new()),
            kv,
            disk: DiskStore::new(pool),
            network,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &PersisterConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkMonitor {
        &self.network
    }

    pub fn disk(&self) -> &DiskStore {
        &self.disk
    }

    fn policy(&self, entry: &CacheEntry) -> CachePolicy {
        self.config.policy_for(entry.category)
    }

    fn lookup(&self, entry: &CacheEntry, now: DateTime<Utc>, source: CacheSource) -> CacheLookup {
        CacheLookup {
            data: entry.data.clone(),
            stale: entry.is_stale(now, &self.policy(entry)),
            source,
        }
    }

    /// Hydrates memory from the persisted blob
    ///
    /// A blob with the wrong buster, older than `max_age`, or unreadable is
    /// removed and nothing is restored. Returns the number of entries loaded.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<usize, CacheError> {
        let Some(raw) = self.kv.get_item(PERSIST_KEY)? else {
            debug!("No persisted cache");
            return Ok(0);
        };

        let client: PersistedClient = match serde_json::from_str(&raw) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted cache");
                self.kv.remove_item(PERSIST_KEY)?;
                return Ok(0);
            }
        };

        let now = self.clock.now();
        if client.buster != self.config.buster {
            info!(found = %client.buster, expected = %self.config.buster, "Discarding persisted cache with old version");
            self.kv.remove_item(PERSIST_KEY)?;
            return Ok(0);
        }
        if now - client.timestamp >= self.config.max_age {
            info!(persisted_at = %client.timestamp, "Discarding persisted cache past max age");
            self.kv.remove_item(PERSIST_KEY)?;
            return Ok(0);
        }

        let mut memory = self.memory.write().await;
        let mut restored = 0;
        for entry in client.entries {
            if entry.is_expired(now, &self.policy(&entry)) {
                continue;
            }
            memory.insert(entry.key.identity(), entry);
            restored += 1;
        }

        info!(restored, "Restored persisted cache");
        Ok(restored)
    }

    /// Snapshots live memory entries into the key-value tier
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<usize, CacheError> {
        let now = self.clock.now();
        let mut entries: Vec<CacheEntry> = self
            .memory
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now, &self.policy(entry)))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.key.identity());

        let count = entries.len();
        let client = PersistedClient {
            buster: self.config.buster.clone(),
            timestamp: now,
            entries,
        };
        self.kv.set_item(PERSIST_KEY, &serde_json::to_string(&client)?)?;

        debug!(count, "Persisted cache snapshot");
        Ok(count)
    }

    /// Reads a key from memory, then from disk
    ///
    /// Disk hits are promoted to memory. Expired entries are misses.
    pub async fn get(&self, key: &QueryKey) -> Result<Option<CacheLookup>, CacheError> {
        let now = self.clock.now();
        let identity = key.identity();

        if let Some(entry) = self.memory.read().await.get(&identity) {
            if !entry.is_expired(now, &self.policy(entry)) {
                return Ok(Some(self.lookup(entry, now, CacheSource::Memory)));
            }
        }

        match self.disk.get(key).await? {
            Some(entry) if !entry.is_expired(now, &self.policy(&entry)) => {
                let lookup = self.lookup(&entry, now, CacheSource::Disk);
                self.memory.write().await.insert(identity, entry);
                Ok(Some(lookup))
            }
            _ => Ok(None),
        }
    }

    /// Stores a result in memory and on disk
    pub async fn set(&self, key: &QueryKey, data: Value) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key.clone(), data, self.clock.now());
        self.disk.put(&entry).await?;
        self.memory.write().await.insert(key.identity(), entry);
        Ok(())
    }

    /// Returns cached data when fresh, otherwise runs `fetcher`
    ///
    /// Offline, any cached data is returned regardless of staleness. When the
    /// fetcher fails and something is cached, the stale copy is returned.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<CacheLookup, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, PortError>>,
    {
        let cached = self.get(key).await?;

        if let Some(hit) = &cached {
            if !hit.stale {
                return Ok(hit.clone());
            }
        }

        if !self.network.is_online() {
            return cached.ok_or_else(|| CacheError::Offline {
                key: key.identity(),
            });
        }

        match fetcher().await {
            Ok(data) => {
                self.set(key, data.clone()).await?;
                Ok(CacheLookup {
                    data,
                    stale: false,
                    source: CacheSource::Network,
                })
            }
            Err(error) => match cached {
                Some(stale) => {
                    warn!(key = %key, error = %error, "Fetch failed, serving cached data");
                    Ok(stale)
                }
                None => Err(error.into()),
            },
        }
    }

    /// Marks every entry under `prefix` as stale
    ///
    /// Returns the number of memory entries marked.
    pub async fn invalidate(&self, prefix: &QueryKey) -> Result<usize, CacheError> {
        let mut marked = 0;
        for entry in self.memory.write().await.values_mut() {
            if entry.key.starts_with(prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        let on_disk = self.disk.invalidate_prefix(prefix).await?;
        debug!(prefix = %prefix, marked, on_disk, "Invalidated queries");
        Ok(marked)
    }

    /// Drops expired entries from memory and disk
    pub async fn collect_garbage(&self) -> Result<GcReport, CacheError> {
        let now = self.clock.now();
        let memory = {
            let mut memory = self.memory.write().await;
            let before = memory.len();
            memory.retain(|_, entry| !entry.is_expired(now, &self.config.policy_for(entry.category)));
            before - memory.len()
        };
        let disk = self
            .disk
            .delete_expired(now, |category| self.config.policy_for(category))
            .await?;

        let report = GcReport { memory, disk };
        if report != GcReport::default() {
            info!(memory = report.memory, disk = report.disk, "Collected expired cache entries");
        }
        Ok(report)
    }

    /// Empties every tier
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.memory.write().await.clear();
        self.kv.remove_item(PERSIST_KEY)?;
        self.disk.clear().await?;
        info!("Cache cleared");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.memory.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memory.read().await.is_empty()
    }
}
