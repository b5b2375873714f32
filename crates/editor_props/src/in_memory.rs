//! In-memory collaborators, used when the service runs without a live editor
//! and by the tests.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::FormConfig;
use crate::id::Id;
use crate::source::{ConfigFiller, DepEntry, DepTarget, DepTargetType, DependencyIndex, NodeLookup};

/// Set of ids considered live.
#[derive(Debug, Default)]
pub struct LiveNodeSet {
    ids: RwLock<HashSet<String>>,
}

impl LiveNodeSet {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().map(|id| id.into().key()).collect()),
        }
    }
}

impl NodeLookup for LiveNodeSet {
    fn node_exists(&self, id: &Id) -> bool {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id.key())
    }
}

/// Dependency index backed by a map of targets.
#[derive(Debug, Default)]
pub struct InMemoryDepIndex {
    targets: RwLock<HashMap<DepTargetType, DepTarget>>,
}

impl InMemoryDepIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` on node `id` references another node, creating the target if needed.
    pub fn add_dep(&self, kind: DepTargetType, id: &Id, key: impl Into<String>) {
        let mut targets = self.targets.write().unwrap_or_else(PoisonError::into_inner);
        let entry: &mut DepEntry = targets
            .entry(kind)
            .or_insert_with(|| DepTarget::new(kind))
            .deps
            .entry(id.key())
            .or_default();
        entry.keys.push(key.into());
    }
}

impl DependencyIndex for InMemoryDepIndex {
    fn target(&self, kind: DepTargetType) -> Option<DepTarget> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }
}

/// Filler that returns the config unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughFiller;

#[async_trait]
impl ConfigFiller for PassthroughFiller {
    async fn fill_config(&self, config: FormConfig) -> anyhow::Result<FormConfig> {
        Ok(config)
    }
}
