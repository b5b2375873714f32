//! Accessors for component nodes held as JSON objects.

use serde_json::Value;

use crate::id::Id;

pub const ID_KEY: &str = "id";
pub const TYPE_KEY: &str = "type";
pub const ITEMS_KEY: &str = "items";

pub fn node_id(node: &Value) -> Option<Id> {
    node.get(ID_KEY).and_then(Id::from_value)
}

/// The node's `type`, ignoring empty strings.
pub fn node_type(node: &Value) -> Option<&str> {
    node.get(TYPE_KEY)
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

pub fn set_node_id(node: &mut Value, id: &Id) {
    if let Value::Object(map) = node {
        map.insert(ID_KEY.to_string(), id.to_value());
    }
}

/// Children of a node, only when `items` is an array.
pub fn children_mut(node: &mut Value) -> Option<&mut Vec<Value>> {
    node.get_mut(ITEMS_KEY).and_then(Value::as_array_mut)
}

pub fn find_by_id_mut<'a>(nodes: &'a mut [Value], id: &Id) -> Option<&'a mut Value> {
    nodes
        .iter_mut()
        .find(|node| node_id(node).is_some_and(|candidate| candidate.same_key(id)))
}
