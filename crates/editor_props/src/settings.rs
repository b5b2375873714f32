//! Tunables of the property service, loadable from a RON file.
//!
//! Every field has a default, so a settings file only needs to name the
//! values it changes. An empty or missing file yields [`PropsSettings::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::PropsError;

/// How `set_new_item_id` treats the children of the node it was called on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildIdPolicy {
    /// Children always get new ids, whatever `force` the caller passed.
    #[default]
    Regenerate,
    /// Children follow the caller's `force` flag.
    Inherit,
}

/// Overrides applied to the `"area"` pseudo type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaSettings {
    /// Type whose form config and initial value `"area"` borrows.
    pub source_type: String,
    pub class_name: String,
    pub background_color: String,
}

impl Default for AreaSettings {
    fn default() -> Self {
        Self {
            source_type: "button".into(),
            class_name: "action-area".into(),
            background_color: "rgba(255, 255, 255, 0)".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropsSettings {
    /// Type used for new ids when a node carries no `type`.
    pub fallback_type: String,
    /// Types that start out with an absolute layout and an empty `items` list.
    pub container_types: Vec<String>,
    pub area: AreaSettings,
    pub child_ids: ChildIdPolicy,
}

impl Default for PropsSettings {
    fn default() -> Self {
        Self {
            fallback_type: "component".into(),
            container_types: vec!["page".into(), "container".into()],
            area: AreaSettings::default(),
            child_ids: ChildIdPolicy::default(),
        }
    }
}

impl PropsSettings {
    pub fn from_ron_str(content: &str) -> Result<Self, PropsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(ron::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PropsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    pub fn is_container(&self, type_name: &str) -> bool {
        self.container_types.iter().any(|t| t == type_name)
    }
}
