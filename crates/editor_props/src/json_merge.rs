use serde_json::{Map, Value};

/// Trait for recursively merging property values.
pub(crate) trait MergeFrom {
    /// Merge from a source of the same type.
    fn merge_from(&mut self, other: &Self);

    /// Merge from an optional source of the same type.
    fn merge_from_option(&mut self, other: Option<&Self>) {
        if let Some(other) = other {
            self.merge_from(other);
        }
    }
}

impl MergeFrom for Map<String, Value> {
    fn merge_from(&mut self, other: &Self) {
        for (k, v) in other {
            if let Some(existing) = self.get_mut(k) {
                existing.merge_from(v);
            } else {
                self.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Objects merge key by key, arrays merge position by position, anything else
/// is replaced by the override.
impl MergeFrom for Value {
    fn merge_from(&mut self, other: &Self) {
        match (self, other) {
            (Value::Object(this), Value::Object(other)) => this.merge_from(other),
            (Value::Array(this), Value::Array(other)) => {
                for (i, v) in other.iter().enumerate() {
                    if let Some(existing) = this.get_mut(i) {
                        existing.merge_from(v);
                    } else {
                        this.push(v.clone());
                    }
                }
            }
            (this, other) => *this = other.clone(),
        }
    }
}

/// Deep-merge each layer onto an empty object, later layers winning.
pub(crate) fn merge_layers<'a>(layers: impl IntoIterator<Item = Option<&'a Value>>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        merged.merge_from_option(layer);
    }
    merged
}
