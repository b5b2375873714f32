use std::fmt;

use serde_json::{Map, Value};

use crate::errors::PropsError;

/// Path to a (possibly nested) field of a component node.
///
/// Accepts dot and bracket notation: `style.color`, `items[0].id`, `items.0.id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyPath(pub Vec<String>);

impl KeyPath {
    pub fn parse(path: &str) -> Result<Self, PropsError> {
        let invalid = || PropsError::InvalidKeyPath(path.to_string());
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();
        // Set right after a closing bracket; the next char must start a new segment.
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() && !after_bracket {
                        return Err(invalid());
                    }
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    let inner = inner.trim().trim_matches(|c| c == '"' || c == '\'');
                    if !closed || inner.is_empty() {
                        return Err(invalid());
                    }
                    parts.push(inner.to_string());
                    after_bracket = true;
                }
                ']' => return Err(invalid()),
                c => {
                    if after_bracket {
                        return Err(invalid());
                    }
                    current.push(c);
                }
            }
        }

        if !current.is_empty() {
            parts.push(current);
        } else if !after_bracket {
            return Err(invalid());
        }

        Ok(KeyPath(parts))
    }

    /// Read the value at this path. Missing segments yield `None`.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Write `value` at this path, creating intermediate containers on the way.
    ///
    /// A missing or scalar intermediate becomes an array when the following
    /// segment is an index and an object otherwise.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), PropsError> {
        let Some((last, parents)) = self.0.split_last() else {
            return Err(PropsError::InvalidKeyPath(String::new()));
        };

        let mut current = root;
        for (i, segment) in parents.iter().enumerate() {
            current = self.child_mut(current, segment, &self.0[i + 1])?;
        }

        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
                Ok(())
            }
            Value::Array(items) => {
                let index = self.index(last)?;
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
                Ok(())
            }
            _ => Err(PropsError::NotAnObject("key path parent")),
        }
    }

    fn child_mut<'a>(
        &self,
        current: &'a mut Value,
        segment: &str,
        next: &str,
    ) -> Result<&'a mut Value, PropsError> {
        let slot = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = self.index(segment)?;
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                &mut items[index]
            }
            _ => return Err(PropsError::NotAnObject("key path parent")),
        };

        if !slot.is_object() && !slot.is_array() {
            *slot = if next.parse::<usize>().is_ok() {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
        }
        Ok(slot)
    }

    fn index(&self, segment: &str) -> Result<usize, PropsError> {
        segment
            .parse::<usize>()
            .map_err(|_| PropsError::InvalidKeyPath(self.to_string()))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
