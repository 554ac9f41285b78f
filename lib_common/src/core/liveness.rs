//! # Tracked Keys and the Liveness Sweep
//!
//! At startup the agent discovers the keys it will watch: one pattern
//! query per named group, after which the set is immutable. Every monitor
//! interval the coordinator sweeps the whole set with per-key existence
//! queries.
//!
//! A failed existence query is counted the same as an absent key. That
//! bias is deliberate: the sweep exists to raise an alarm, and a store
//! hiccup should make the alarm louder, never quieter. There are no
//! retries.

use anyhow::{Context, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

/// The default tracked-key groups: `(group name, key pattern)`.
pub const DEFAULT_GROUPS: [(&str, &str); 2] =
    [("checkin", "rpjios.checkin.*"), ("heartbeat", "*:heartbeat")];

/// One named category of monitored keys.
#[derive(Debug, Clone)]
pub struct KeyGroup {
    /// The group's display name.
    pub name: String,
    /// The pattern the group was discovered with.
    pub pattern: String,
    /// The discovered keys, fixed after startup.
    pub keys: Vec<String>,
}

/// The full, immutable-after-startup set of monitored keys.
#[derive(Debug, Clone, Default)]
pub struct TrackedKeys {
    groups: Vec<KeyGroup>,
}

impl TrackedKeys {
    /// The named groups, in discovery order.
    pub fn groups(&self) -> &[KeyGroup] {
        &self.groups
    }

    /// Total number of tracked keys across all groups.
    pub fn total(&self) -> u64 {
        self.groups.iter().map(|g| g.keys.len() as u64).sum()
    }
}

/// The two store queries the liveness machinery needs. Implemented for the
/// live connection; tests substitute an in-memory key set.
pub trait StoreProbe {
    /// Whether `key` currently exists in the store.
    fn exists(&mut self, key: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// All keys matching `pattern`.
    fn keys_matching(
        &mut self,
        pattern: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

impl StoreProbe for MultiplexedConnection {
    async fn exists(&mut self, key: &str) -> Result<bool> {
        AsyncCommands::exists::<_, bool>(self, key)
            .await
            .with_context(|| format!("EXISTS {key}"))
    }

    async fn keys_matching(&mut self, pattern: &str) -> Result<Vec<String>> {
        AsyncCommands::keys::<_, Vec<String>>(self, pattern)
            .await
            .with_context(|| format!("KEYS {pattern}"))
    }
}

/// Queries every group pattern once and fixes the tracked key set.
///
/// Any query failing is fatal to startup; there is nothing sensible to
/// monitor without a complete set.
pub async fn discover<P: StoreProbe>(
    probe: &mut P,
    groups: &[(&str, &str)],
) -> Result<TrackedKeys> {
    let mut discovered = Vec::with_capacity(groups.len());
    for (name, pattern) in groups {
        let keys = probe
            .keys_matching(pattern)
            .await
            .with_context(|| format!("failed to query expected key group '{name}'"))?;
        discovered.push(KeyGroup {
            name: (*name).to_string(),
            pattern: (*pattern).to_string(),
            keys,
        });
    }
    Ok(TrackedKeys { groups: discovered })
}

/// Sweeps every tracked key once and returns the number lost.
///
/// A key counts as lost when the existence query returns false *or*
/// fails; the result is therefore always within `[0, total]`.
pub async fn sweep<P: StoreProbe>(probe: &mut P, tracked: &TrackedKeys) -> u64 {
    let mut lost = 0;
    for group in tracked.groups() {
        for key in &group.keys {
            match probe.exists(key).await {
                Ok(true) => {}
                Ok(false) => lost += 1,
                Err(e) => {
                    log::debug!("existence query for '{key}' failed, counting as lost: {e:#}");
                    lost += 1;
                }
            }
        }
    }
    lost
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::{HashMap, HashSet};

    /// An in-memory stand-in for the store: a set of live keys plus a set
    /// of keys whose queries should fail outright.
    struct FakeStore {
        live: HashSet<String>,
        failing: HashSet<String>,
        patterns: HashMap<String, Vec<String>>,
    }

    impl FakeStore {
        fn new(live: &[&str]) -> Self {
            Self {
                live: live.iter().map(|k| k.to_string()).collect(),
                failing: HashSet::new(),
                patterns: HashMap::new(),
            }
        }
    }

    impl StoreProbe for FakeStore {
        async fn exists(&mut self, key: &str) -> Result<bool> {
            if self.failing.contains(key) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.live.contains(key))
        }

        async fn keys_matching(&mut self, pattern: &str) -> Result<Vec<String>> {
            self.patterns
                .get(pattern)
                .cloned()
                .ok_or_else(|| anyhow!("no such pattern"))
        }
    }

    fn tracked(groups: &[(&str, &[&str])]) -> TrackedKeys {
        TrackedKeys {
            groups: groups
                .iter()
                .map(|(name, keys)| KeyGroup {
                    name: name.to_string(),
                    pattern: format!("{name}.*"),
                    keys: keys.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_sweep_counts_absent_keys() {
        // 12 tracked keys, 3 of them gone.
        let keys: Vec<String> = (0..12).map(|i| format!("node.{i}")).collect();
        let key_refs: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        let tracked = tracked(&[("checkin", &key_refs[..8]), ("heartbeat", &key_refs[8..])]);
        assert_eq!(tracked.total(), 12);

        let live: Vec<&str> = key_refs
            .iter()
            .copied()
            .filter(|k| !matches!(*k, "node.2" | "node.5" | "node.9"))
            .collect();
        let mut store = FakeStore::new(&live);
        assert_eq!(sweep(&mut store, &tracked).await, 3);
    }

    #[tokio::test]
    async fn test_sweep_counts_query_failures_as_lost() {
        let tracked = tracked(&[("checkin", &["a", "b", "c"])]);
        let mut store = FakeStore::new(&["a", "b", "c"]);
        store.failing.insert("b".to_string());
        assert_eq!(sweep(&mut store, &tracked).await, 1);
    }

    #[tokio::test]
    async fn test_sweep_all_alive_reports_zero() {
        let tracked = tracked(&[("checkin", &["a", "b"])]);
        let mut store = FakeStore::new(&["a", "b"]);
        assert_eq!(sweep(&mut store, &tracked).await, 0);
    }

    #[tokio::test]
    async fn test_discover_builds_groups_in_order() {
        let mut store = FakeStore::new(&[]);
        store.patterns.insert(
            "rpjios.checkin.*".to_string(),
            vec!["rpjios.checkin.a".to_string(), "rpjios.checkin.b".to_string()],
        );
        store
            .patterns
            .insert("*:heartbeat".to_string(), vec!["pi:heartbeat".to_string()]);

        let tracked = discover(&mut store, &DEFAULT_GROUPS).await.unwrap();
        assert_eq!(tracked.total(), 3);
        assert_eq!(tracked.groups()[0].name, "checkin");
        assert_eq!(tracked.groups()[0].keys.len(), 2);
        assert_eq!(tracked.groups()[1].name, "heartbeat");
    }

    #[tokio::test]
    async fn test_discover_fails_when_any_query_fails() {
        let mut store = FakeStore::new(&[]);
        // Only the first pattern resolves.
        store
            .patterns
            .insert("rpjios.checkin.*".to_string(), vec![]);
        assert!(discover(&mut store, &DEFAULT_GROUPS).await.is_err());
    }
}
