//! Connectivity tracking
//!
//! Whoever observes the network (a probe, the platform, a failed request)
//! reports transitions here; the persister and the mutation queue read the
//! current state or subscribe to changes.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    pub online: bool,
    pub changed_at: DateTime<Utc>,
}

/// Shared handle to the current connectivity state
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    sender: Arc<watch::Sender<NetworkState>>,
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(NetworkState {
            online,
            changed_at: Utc::now(),
        });
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        self.sender.borrow().online
    }

    pub fn state(&self) -> NetworkState {
        *self.sender.borrow()
    }

    /// Records the current connectivity, returning true on a transition
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|state| {
            if state.online == online {
                return false;
            }
            state.online = online;
            state.changed_at = Utc::now();
            true
        });
        if changed {
            info!(online, "Network state changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.sender.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
