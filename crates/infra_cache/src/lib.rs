//! Query Cache Persistence Layer
//!
//! This crate keeps query results available across restarts and while the
//! client is offline, and queues writes made offline until the network
//! returns.
//!
//! # Tiers
//!
//! ```text
//! ┌──────────────┐  persist()/restore()  ┌────────────────────────┐
//! │   memory     │ ◄──────────────────► │ sync key-value blob    │
//! │ (live cache) │                       │ (versioned, max age)   │
//! └──────┬───────┘                       └────────────────────────┘
//!        │ write-through / promote on miss
//! ┌──────┴───────┐
//! │ SQLite store │  query_cache, pending_mutations
//! └──────────────┘
//! ```
//!
//! Staleness and garbage-collection windows depend on the data category,
//! derived from the first segment of the query key.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_cache::{create_pool, CacheDbConfig, QueryPersister, PersisterConfig};
//!
//! let pool = create_pool(CacheDbConfig::new("sqlite://cache.db")).await?;
//! let persister = QueryPersister::new(PersisterConfig::default(), kv, pool, network);
//! persister.restore().await?;
//! ```

pub mod pool;
pub mod error;
pub mod clock;
pub mod key;
pub mod policy;
pub mod kv;
pub mod disk;
pub mod network;
pub mod persister;
pub mod offline_queue;

pub use pool::{CachePool, CacheDbConfig, create_pool};
pub use error::CacheError;
pub use clock::{Clock, SystemClock, ManualClock};
pub use key::QueryKey;
pub use policy::{DataCategory, CachePolicy, CacheEntry};
pub use kv::{KvStorage, FileKvStorage, MemoryKvStorage};
pub use disk::DiskStore;
pub use network::{NetworkMonitor, NetworkState};
pub use persister::{
    QueryPersister, PersisterConfig, PersistedClient, CacheLookup, CacheSource, GcReport,
    CACHE_VERSION, PERSIST_KEY,
};
pub use offline_queue::{
    MutationQueue, PendingMutation, MutationExecutor, SyncReport, spawn_sync_on_reconnect,
};
