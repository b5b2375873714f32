//! Property service of the page editor.
//!
//! Keeps, per component type, the form config that drives the property panel
//! and the initial value of new components. When subtrees are pasted or
//! duplicated it hands out fresh ids and rewrites references between the
//! copies (see [`PropsService::set_new_item_id`] and
//! [`PropsService::replace_relate_id`]).

pub mod case;
mod errors;
mod events;
pub mod id;
pub mod in_memory;
mod json_merge;
pub mod key_path;
pub mod node;
mod plugin;
pub mod remap;
mod service;
pub mod settings;
pub mod source;

/// Ordered field descriptors of a property form.
pub type FormConfig = Vec<serde_json::Value>;

pub use errors::PropsError;
pub use events::PropsEvent;
pub use id::{Id, create_id};
pub use in_memory::{InMemoryDepIndex, LiveNodeSet, PassthroughFiller};
pub use key_path::KeyPath;
pub use plugin::PropsPlugin;
pub use remap::{RelateIdMap, reassign_ids};
pub use service::{AREA_TYPE, PropsService, PropsServiceBuilder};
pub use settings::{AreaSettings, ChildIdPolicy, PropsSettings};
pub use source::{ConfigFiller, DepEntry, DepTarget, DepTargetType, DependencyIndex, NodeLookup};
