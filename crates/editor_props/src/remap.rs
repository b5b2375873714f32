use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::id::Id;
use crate::node;
use crate::settings::ChildIdPolicy;
use crate::source::NodeLookup;

/// Old id -> new id, recorded while ids are reassigned.
///
/// Keys are the canonical string form of the old id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelateIdMap(HashMap<String, Id>);

impl RelateIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old_id: &Id, new_id: Id) {
        self.0.insert(old_id.key(), new_id);
    }

    pub fn get(&self, old_id: &Id) -> Option<&Id> {
        self.0.get(&old_id.key())
    }

    /// Look up a reference read out of a node; non-id values never match.
    pub fn get_value(&self, value: &Value) -> Option<&Id> {
        Id::from_value(value).and_then(|id| self.get(&id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Id)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Extend<(String, Id)> for RelateIdMap {
    fn extend<T: IntoIterator<Item = (String, Id)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for RelateIdMap {
    type Item = (String, Id);
    type IntoIter = std::collections::hash_map::IntoIter<String, Id>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Inputs of one id reassignment pass.
pub struct Reassign<'a> {
    pub lookup: &'a dyn NodeLookup,
    pub fallback_type: &'a str,
    pub child_ids: ChildIdPolicy,
    /// Id generator, called with the node type.
    pub create_id: &'a dyn Fn(&str) -> String,
}

/// Give `node` and its `items` subtree new ids, pre-order.
///
/// A node is renamed when `force` is set or its current id is live according
/// to the lookup. Children are visited with `force = true` under
/// [`ChildIdPolicy::Regenerate`] and with the caller's `force` under
/// [`ChildIdPolicy::Inherit`]. Only array `items` are descended into.
///
/// The node is rewritten in place; the returned map holds one entry per
/// renamed node that had an id before.
pub fn reassign_ids(node: &mut Value, force: bool, ctx: &Reassign<'_>) -> RelateIdMap {
    let mut relate_ids = RelateIdMap::new();
    reassign_into(node, force, ctx, &mut relate_ids);
    relate_ids
}

fn reassign_into(node: &mut Value, force: bool, ctx: &Reassign<'_>, relate_ids: &mut RelateIdMap) {
    if !node.is_object() {
        return;
    }

    let old_id = node::node_id(node);
    let live = old_id
        .as_ref()
        .is_some_and(|id| ctx.lookup.node_exists(id));

    if force || live {
        let new_id = Id::from((ctx.create_id)(
            node::node_type(node).unwrap_or(ctx.fallback_type),
        ));
        // A node without an id has nothing to be referenced by, so it gets
        // no entry.
        if let Some(old_id) = &old_id {
            trace!(%old_id, %new_id, "reassigned node id");
            relate_ids.insert(old_id, new_id.clone());
        }
        node::set_node_id(node, &new_id);
    }

    let child_force = match ctx.child_ids {
        ChildIdPolicy::Regenerate => true,
        ChildIdPolicy::Inherit => force,
    };
    if let Some(items) = node::children_mut(node) {
        for item in items {
            reassign_into(item, child_force, ctx, relate_ids);
        }
    }
}
