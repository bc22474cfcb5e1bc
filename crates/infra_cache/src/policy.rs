//! Staleness and garbage-collection windows per data category

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::key::QueryKey;

/// How volatile a kind of data is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    /// Modules, rules, settings: change on deploys or admin edits
    Static,
    /// Companies, contacts, products
    Reference,
    /// Visits, financial statements, tasks
    Activity,
    /// Notifications, dashboards, live metrics
    Realtime,
    Default,
}

impl DataCategory {
    pub const ALL: [DataCategory; 5] = [
        DataCategory::Static,
        DataCategory::Reference,
        DataCategory::Activity,
        DataCategory::Realtime,
        DataCategory::Default,
    ];

    /// Category of a key by its first segment
    pub fn from_root(root: &str) -> Self {
        match root {
            "modules" | "rules" | "settings" | "permissions" => DataCategory::Static,
            "companies" | "contacts" | "products" => DataCategory::Reference,
            "visits" | "financial-statements" | "tasks" => DataCategory::Activity,
            "notifications" | "dashboard" | "metrics" => DataCategory::Realtime,
            _ => DataCategory::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Static => "static",
            DataCategory::Reference => "reference",
            DataCategory::Activity => "activity",
            DataCategory::Realtime => "realtime",
            DataCategory::Default => "default",
        }
    }

    pub fn default_policy(&self) -> CachePolicy {
        match self {
            DataCategory::Static => CachePolicy::new(Duration::minutes(30), Duration::days(7)),
            DataCategory::Reference => CachePolicy::new(Duration::minutes(5), Duration::hours(24)),
            DataCategory::Activity => CachePolicy::new(Duration::minutes(2), Duration::hours(24)),
            DataCategory::Realtime => CachePolicy::new(Duration::seconds(30), Duration::minutes(10)),
            DataCategory::Default => CachePolicy::new(Duration::minutes(1), Duration::hours(24)),
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown data category '{}'", s))
    }
}

/// Freshness windows for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which data is served but refetched
    pub stale_time: Duration,
    /// Age after which data is dropped
    pub gc_time: Duration,
}

impl CachePolicy {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self { stale_time, gc_time }
    }
}

/// A cached query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: QueryKey,
    pub category: DataCategory,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub invalidated: bool,
}

impl CacheEntry {
    pub fn new(key: QueryKey, data: Value, updated_at: DateTime<Utc>) -> Self {
        Self {
            category: key.category(),
            key,
            data,
            updated_at,
            invalidated: false,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.updated_at
    }

    pub fn is_stale(&self, now: DateTime<Utc>, policy: &CachePolicy) -> bool {
        self.invalidated || self.age(now) >= policy.stale_time
    }

    pub fn is_expired(&self, now: DateTime<Utc>, policy: &CachePolicy) -> bool {
        self.age(now) >= policy.gc_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stale_boundary_is_inclusive() {
        let start = Utc::now();
        let entry = CacheEntry::new(QueryKey::from_segments(["companies"]), json!([]), start);
        let policy = DataCategory::Reference.default_policy();

        assert!(!entry.is_stale(start + Duration::minutes(5) - Duration::milliseconds(1), &policy));
        assert!(entry.is_stale(start + Duration::minutes(5), &policy));
        assert!(!entry.is_expired(start + Duration::minutes(5), &policy));
        assert!(entry.is_expired(start + Duration::hours(24), &policy));
    }

    #[test]
    fn test_invalidated_entry_is_stale_immediately() {
        let now = Utc::now();
        let mut entry = CacheEntry::new(QueryKey::from_segments(["modules"]), json!({}), now);
        entry.invalidated = true;
        assert!(entry.is_stale(now, &DataCategory::Static.default_policy()));
    }

    #[test]
    fn test_stale_time_shorter_than_gc_time() {
        for category in DataCategory::ALL {
            let policy = category.default_policy();
            assert!(policy.stale_time < policy.gc_time, "{}", category);
        }
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in DataCategory::ALL {
            assert_eq!(category.as_str().parse::<DataCategory>().unwrap(), category);
        }
    }
}
