use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::graph_builder::{build_map_graph, MapGraph};
use super::models::LevelMap;
use super::planner::{PathPlanner, PlannerOptions};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapKey {
    pub map_id: String,
    pub version: u64,
}

impl MapKey {
    pub fn new(map_id: impl Into<String>, version: u64) -> Self {
        Self { map_id: map_id.into(), version }
    }
}

/// Built graphs shared across requests, keyed by map id and version.
///
/// Lookups take the read lock only. A miss builds outside the map lock while
/// holding `build_lock`, so concurrent misses build once and readers of other
/// maps are never held up by a build.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: RwLock<HashMap<MapKey, Arc<MapGraph>>>,
    build_lock: Mutex<()>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MapKey) -> Option<Arc<MapGraph>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    pub fn get_or_build(&self, key: &MapKey, levels: &[LevelMap]) -> Arc<MapGraph> {
        self.get_or_build_with(key, || build_map_graph(levels))
    }

    pub fn get_or_build_with(&self, key: &MapKey, build: impl FnOnce() -> MapGraph) -> Arc<MapGraph> {
        if let Some(hit) = self.get(key) {
            debug!("cache: hit {}@{}", key.map_id, key.version);
            return hit;
        }
        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // another builder may have finished while we waited
        if let Some(hit) = self.get(key) {
            debug!("cache: hit {}@{} after wait", key.map_id, key.version);
            return hit;
        }
        debug!("cache: miss {}@{}, building", key.map_id, key.version);
        let built = Arc::new(build());

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let newer_cached = entries.keys().any(|k| k.map_id == key.map_id && k.version > key.version);
        if newer_cached {
            debug!("cache: {}@{} is stale, not cached", key.map_id, key.version);
            return built;
        }
        let before = entries.len();
        entries.retain(|k, _| k.map_id != key.map_id);
        if entries.len() < before {
            debug!("cache: evicted {} older version(s) of {}", before - entries.len(), key.map_id);
        }
        entries.insert(key.clone(), built.clone());
        built
    }

    /// Drops every cached version of `map_id`; returns how many were removed.
    pub fn invalidate(&self, map_id: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|k, _| k.map_id != map_id);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn planner(&self, key: &MapKey, levels: &[LevelMap], opts: PlannerOptions) -> PathPlanner {
        PathPlanner::from_graph(self.get_or_build(key, levels)).with_options(opts)
    }
}
