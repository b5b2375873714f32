use serde_json::{Map, Value};

use crate::FormConfig;

/// Extension hooks around the public service operations.
///
/// All hooks default to doing nothing; implement the ones you need. Plugins
/// run in attach order, and each sees what the previous one left behind.
pub trait PropsPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Runs on the raw config before it is normalized and stored.
    fn before_set_props_config(&self, _type_name: &str, _config: &mut FormConfig) {}

    /// May redirect the lookup to another type.
    fn before_get_props_config(&self, _type_name: &mut String) {}

    /// Runs on the copy handed out by `get_props_config`.
    fn after_get_props_config(&self, _type_name: &str, _config: &mut FormConfig) {}

    fn before_fill_config(&self, _config: &mut FormConfig) {}

    /// Runs on the filler's output.
    fn after_fill_config(&self, _config: &mut FormConfig) {}

    /// Runs on a value template before the object check and the store.
    fn before_set_props_value(&self, _type_name: &str, _value: &mut Value) {}

    fn after_get_default_props_value(&self, _type_name: &str, _value: &mut Value) {}

    /// May change the requested type and the caller's options.
    fn before_get_props_value(
        &self,
        _type_name: &mut String,
        _options: &mut Map<String, Value>,
    ) {
    }

    /// Runs on the composed initial value handed out by `get_props_value`.
    fn after_get_props_value(&self, _type_name: &str, _value: &mut Value) {}

    /// Runs on every generated id, including ids handed out during reassignment.
    fn after_create_id(&self, _type_name: &str, _id: &mut String) {}

    fn before_set_new_item_id(&self, _node: &mut Value, _force: &mut bool) {}

    /// Runs after the new ids are recorded in the relate id table.
    fn after_set_new_item_id(&self, _node: &mut Value) {}
}
