use std::collections::HashMap;

use async_trait::async_trait;
use strum::Display;

use crate::FormConfig;
use crate::id::Id;

/// Answers whether a node id is currently live in the editor's tree.
pub trait NodeLookup: Send + Sync {
    fn node_exists(&self, id: &Id) -> bool;
}

/// Kinds of dependency targets tracked by the editor's dependency index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DepTargetType {
    Default,
    CodeBlock,
    DataSource,
    DataSourceCond,
    DataSourceMethod,
    RelatedCompWhenCopy,
}

/// Key paths of one node that hold references to other nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepEntry {
    pub keys: Vec<String>,
}

/// A dependency target: for each source node id, the fields that reference it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepTarget {
    pub kind: DepTargetType,
    /// Keyed by the canonical string form of the node id.
    pub deps: HashMap<String, DepEntry>,
}

impl DepTarget {
    pub fn new(kind: DepTargetType) -> Self {
        Self {
            kind,
            deps: HashMap::new(),
        }
    }

    pub fn entry(&self, id: &Id) -> Option<&DepEntry> {
        self.deps.get(&id.key())
    }
}

/// Read access to the editor's dependency index.
pub trait DependencyIndex: Send + Sync {
    fn target(&self, kind: DepTargetType) -> Option<DepTarget>;
}

/// Normalizes a raw list of form fields into a renderable form config.
#[async_trait]
pub trait ConfigFiller: Send + Sync {
    async fn fill_config(&self, config: FormConfig) -> anyhow::Result<FormConfig>;
}
