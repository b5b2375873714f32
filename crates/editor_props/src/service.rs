use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value, json};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace, warn};

use crate::FormConfig;
use crate::case::to_line;
use crate::errors::PropsError;
use crate::events::{Listeners, PropsEvent};
use crate::id::create_id;
use crate::in_memory::{InMemoryDepIndex, LiveNodeSet, PassthroughFiller};
use crate::json_merge::merge_layers;
use crate::key_path::KeyPath;
use crate::node::{self, ID_KEY, TYPE_KEY};
use crate::plugin::PropsPlugin;
use crate::remap::{Reassign, RelateIdMap, reassign_ids};
use crate::settings::PropsSettings;
use crate::source::{ConfigFiller, DepTargetType, DependencyIndex, NodeLookup};

/// Pseudo type that borrows its form and initial value from another type.
pub const AREA_TYPE: &str = "area";

/// Key of the caller's event payload inside `get_props_value` options.
const INPUT_EVENT_KEY: &str = "inputEvent";

#[derive(Debug, Default)]
struct PropsState {
    props_config_map: HashMap<String, FormConfig>,
    props_value_map: HashMap<String, Value>,
    relate_id_map: RelateIdMap,
}

/// Builder for [`PropsService`]. Collaborators that are not provided fall
/// back to the in-memory implementations.
pub struct PropsServiceBuilder {
    node_lookup: Option<Arc<dyn NodeLookup>>,
    dep_index: Option<Arc<dyn DependencyIndex>>,
    filler: Option<Arc<dyn ConfigFiller>>,
    settings: PropsSettings,
}

impl Default for PropsServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropsServiceBuilder {
    pub fn new() -> Self {
        Self {
            node_lookup: None,
            dep_index: None,
            filler: None,
            settings: PropsSettings::default(),
        }
    }

    pub fn with_node_lookup(mut self, lookup: Arc<dyn NodeLookup>) -> Self {
        self.node_lookup = Some(lookup);
        self
    }

    pub fn with_dep_index(mut self, index: Arc<dyn DependencyIndex>) -> Self {
        self.dep_index = Some(index);
        self
    }

    pub fn with_config_filler(mut self, filler: Arc<dyn ConfigFiller>) -> Self {
        self.filler = Some(filler);
        self
    }

    pub fn with_settings(mut self, settings: PropsSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> PropsService {
        PropsService {
            node_lookup: self
                .node_lookup
                .unwrap_or_else(|| Arc::new(LiveNodeSet::default())),
            dep_index: self
                .dep_index
                .unwrap_or_else(|| Arc::new(InMemoryDepIndex::default())),
            filler: self.filler.unwrap_or_else(|| Arc::new(PassthroughFiller)),
            settings: self.settings,
            state: RwLock::new(PropsState::default()),
            listeners: Mutex::new(Listeners::default()),
            plugins: RwLock::new(Vec::new()),
        }
    }
}

/// Per-type form configs and initial values of editor components, plus id
/// regeneration for duplicated subtrees.
///
/// All state lives behind locks so every operation takes `&self`. No lock is
/// held across an `.await`.
pub struct PropsService {
    node_lookup: Arc<dyn NodeLookup>,
    dep_index: Arc<dyn DependencyIndex>,
    filler: Arc<dyn ConfigFiller>,
    settings: PropsSettings,
    state: RwLock<PropsState>,
    listeners: Mutex<Listeners>,
    plugins: RwLock<Vec<Arc<dyn PropsPlugin>>>,
}

impl Debug for PropsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("PropsService")
            .field(
                "config_types",
                &state.props_config_map.keys().collect::<Vec<_>>(),
            )
            .field(
                "value_types",
                &state.props_value_map.keys().collect::<Vec<_>>(),
            )
            .field("relate_ids", &state.relate_id_map.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PropsService {
    pub fn builder() -> PropsServiceBuilder {
        PropsServiceBuilder::new()
    }

    pub fn settings(&self) -> &PropsSettings {
        &self.settings
    }

    /* --------------------------------------------------------------------- */
    /* Form configs                                                          */
    /* --------------------------------------------------------------------- */

    /// Register form configs in bulk. Type names are hyphenated first and
    /// subscribers get [`PropsEvent::ConfigsChanged`] once the batch is done.
    ///
    /// The batch stops at the first failing config. Configs stored before it
    /// stay stored, and the event still goes out when there are any.
    pub async fn set_props_configs<I, K>(&self, configs: I) -> Result<(), PropsError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut stored = 0usize;
        let mut result = Ok(());
        for (type_name, config) in configs {
            let type_name = to_line(type_name.as_ref());
            if let Err(err) = self.set_props_config(&type_name, config).await {
                warn!(%type_name, stored, %err, "props config batch aborted");
                result = Err(err);
                break;
            }
            stored += 1;
        }

        if result.is_ok() || stored > 0 {
            self.emit(PropsEvent::ConfigsChanged);
        }
        result
    }

    pub async fn fill_config(&self, mut config: FormConfig) -> Result<FormConfig, PropsError> {
        let plugins = self.plugins();
        for plugin in &plugins {
            plugin.before_fill_config(&mut config);
        }
        let mut filled = self.filler.fill_config(config).await?;
        for plugin in &plugins {
            plugin.after_fill_config(&mut filled);
        }
        Ok(filled)
    }

    /// Normalize and store the form config of `type_name`, replacing any
    /// previous one. A single field descriptor is treated as a one-item list.
    pub async fn set_props_config(&self, type_name: &str, config: Value) -> Result<(), PropsError> {
        let mut config = match config {
            Value::Array(fields) => fields,
            field => vec![field],
        };
        for plugin in self.plugins() {
            plugin.before_set_props_config(type_name, &mut config);
        }

        let filled = self.fill_config(config).await?;
        debug!(type_name, fields = filled.len(), "registered props config");
        self.state_mut()
            .props_config_map
            .insert(type_name.to_string(), filled);
        Ok(())
    }

    /// A copy of the form config of `type_name`, or the normalized empty
    /// config when none is registered.
    pub async fn get_props_config(&self, type_name: &str) -> Result<FormConfig, PropsError> {
        let plugins = self.plugins();
        let mut type_name = type_name.to_string();
        for plugin in &plugins {
            plugin.before_get_props_config(&mut type_name);
        }
        let lookup_type = if type_name == AREA_TYPE {
            self.settings.area.source_type.as_str()
        } else {
            type_name.as_str()
        };

        let stored = self.state().props_config_map.get(lookup_type).cloned();
        let mut config = match stored {
            Some(config) => config,
            None => self.fill_config(Vec::new()).await?,
        };
        for plugin in &plugins {
            plugin.after_get_props_config(&type_name, &mut config);
        }
        Ok(config)
    }

    /* --------------------------------------------------------------------- */
    /* Initial values                                                        */
    /* --------------------------------------------------------------------- */

    pub async fn set_props_values<I, K>(&self, values: I) -> Result<(), PropsError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (type_name, value) in values {
            self.set_props_value(&to_line(type_name.as_ref()), value)
                .await?;
        }
        Ok(())
    }

    /// Store the initial value template of `type_name`.
    pub async fn set_props_value(&self, type_name: &str, mut value: Value) -> Result<(), PropsError> {
        for plugin in self.plugins() {
            plugin.before_set_props_value(type_name, &mut value);
        }
        if !value.is_object() {
            return Err(PropsError::NotAnObject("props value template"));
        }
        trace!(type_name, "registered props value");
        self.state_mut()
            .props_value_map
            .insert(type_name.to_string(), value);
        Ok(())
    }

    /// The template stored for `type_name`, as registered.
    pub fn stored_props_value(&self, type_name: &str) -> Option<Value> {
        self.state().props_value_map.get(type_name).cloned()
    }

    pub async fn get_default_props_value(&self, type_name: &str) -> Value {
        let mut value = json!({
            "type": type_name,
            "style": {},
            "name": type_name,
        });
        if self.settings.is_container(type_name) {
            value["layout"] = json!("absolute");
            value["items"] = json!([]);
        }
        for plugin in self.plugins() {
            plugin.after_get_default_props_value(type_name, &mut value);
        }
        value
    }

    /// Compose the initial value of a new `type_name` node.
    ///
    /// `options` become part of the node (after `inputEvent` is dropped) and
    /// get fresh ids like any inserted subtree.
    pub async fn get_props_value(
        &self,
        type_name: &str,
        mut options: Map<String, Value>,
    ) -> Result<Value, PropsError> {
        let plugins = self.plugins();
        let mut type_name = type_name.to_string();
        for plugin in &plugins {
            plugin.before_get_props_value(&mut type_name, &mut options);
        }

        let mut value = if type_name == AREA_TYPE {
            self.area_props_value().await?
        } else {
            self.compose_props_value(&type_name, options).await?
        };
        for plugin in &plugins {
            plugin.after_get_props_value(&type_name, &mut value);
        }
        Ok(value)
    }

    async fn area_props_value(&self) -> Result<Value, PropsError> {
        let area = &self.settings.area;
        let mut value = self
            .compose_props_value(&area.source_type, Map::new())
            .await?;

        if let Value::Object(map) = &mut value {
            map.insert("className".into(), Value::String(area.class_name.clone()));
            map.insert("text".into(), Value::String(String::new()));
            if let Some(Value::Object(style)) = map.get_mut("style") {
                style.insert(
                    "backgroundColor".into(),
                    Value::String(area.background_color.clone()),
                );
            }
        }
        Ok(value)
    }

    async fn compose_props_value(
        &self,
        type_name: &str,
        mut options: Map<String, Value>,
    ) -> Result<Value, PropsError> {
        options.remove(INPUT_EVENT_KEY);
        let mut seed = Map::new();
        seed.insert(TYPE_KEY.to_string(), Value::String(type_name.to_string()));
        seed.extend(options);

        let (id, defaults, data) = tokio::join!(
            async { self.create_id(type_name) },
            self.get_default_props_value(type_name),
            self.set_new_item_id(Value::Object(seed), true),
        );
        let data = data?;

        let template = self.stored_props_value(type_name);
        let merged = merge_layers([template.as_ref(), Some(&data)]);

        let mut value = Map::new();
        value.insert(ID_KEY.to_string(), Value::String(id));
        value.extend(into_object(defaults));
        value.extend(into_object(merged));
        Ok(Value::Object(value))
    }

    /* --------------------------------------------------------------------- */
    /* Ids                                                                   */
    /* --------------------------------------------------------------------- */

    pub fn create_id(&self, type_name: &str) -> String {
        let mut id = create_id(type_name);
        for plugin in self.plugins() {
            plugin.after_create_id(type_name, &mut id);
        }
        id
    }

    /// Give `node` (and its `items` subtree) new ids and record old -> new in
    /// the relate id table. See [`reassign_ids`] for which nodes are renamed.
    ///
    /// Entries accumulate until [`clear_relate_id`](Self::clear_relate_id).
    /// New ids go through [`create_id`](Self::create_id).
    pub async fn set_new_item_id(
        &self,
        mut node: Value,
        mut force: bool,
    ) -> Result<Value, PropsError> {
        let plugins = self.plugins();
        for plugin in &plugins {
            plugin.before_set_new_item_id(&mut node, &mut force);
        }
        if !node.is_object() {
            return Err(PropsError::NotAnObject("component node"));
        }

        let create_id = |type_name: &str| self.create_id(type_name);
        let ctx = Reassign {
            lookup: self.node_lookup.as_ref(),
            fallback_type: &self.settings.fallback_type,
            child_ids: self.settings.child_ids,
            create_id: &create_id,
        };
        let relate_ids = reassign_ids(&mut node, force, &ctx);
        if !relate_ids.is_empty() {
            debug!(count = relate_ids.len(), force, "recorded relate ids");
            self.state_mut().relate_id_map.extend(relate_ids);
        }

        for plugin in &plugins {
            plugin.after_set_new_item_id(&mut node);
        }
        Ok(node)
    }

    /// Point references between copied nodes at the copies.
    ///
    /// `targets` are the copies of `originals` whose ids were reassigned
    /// through [`set_new_item_id`](Self::set_new_item_id). For every field the
    /// dependency index lists on an original, the id found there is swapped
    /// for its new id in the matching target. References to nodes that were
    /// not copied stay as they are.
    pub fn replace_relate_id(&self, originals: &[Value], targets: &mut [Value]) {
        let relate_ids = self.relate_id_map();
        if relate_ids.is_empty() {
            return;
        }

        let kind = DepTargetType::RelatedCompWhenCopy;
        let Some(target) = self.dep_index.target(kind) else {
            trace!(%kind, "no dependency target registered");
            return;
        };

        for config in originals {
            let Some(origin_id) = node::node_id(config) else {
                continue;
            };
            let Some(new_id) = relate_ids.get(&origin_id) else {
                continue;
            };
            let Some(target_config) = node::find_by_id_mut(targets, new_id) else {
                continue;
            };
            let Some(entry) = target.entry(&origin_id) else {
                continue;
            };

            for full_key in &entry.keys {
                let key_path = match KeyPath::parse(full_key) {
                    Ok(key_path) => key_path,
                    Err(err) => {
                        warn!(%origin_id, %err, "skipping dependency key");
                        continue;
                    }
                };
                let Some(relate_target_id) = key_path
                    .get(config)
                    .and_then(|relate_origin_id| relate_ids.get_value(relate_origin_id))
                else {
                    continue;
                };

                trace!(%origin_id, %key_path, %relate_target_id, "relinked copied reference");
                if let Err(err) = key_path.set(target_config, relate_target_id.to_value()) {
                    warn!(%origin_id, %key_path, %err, "failed to relink copied reference");
                }
            }
        }
    }

    /// Snapshot of the old -> new id table.
    pub fn relate_id_map(&self) -> RelateIdMap {
        self.state().relate_id_map.clone()
    }

    pub fn clear_relate_id(&self) {
        self.state_mut().relate_id_map.clear();
    }

    /* --------------------------------------------------------------------- */
    /* Lifecycle, listeners, plugins                                         */
    /* --------------------------------------------------------------------- */

    /// Drop all form configs and value templates. The relate id table is kept.
    pub fn reset_state(&self) {
        let mut state = self.state_mut();
        state.props_config_map.clear();
        state.props_value_map.clear();
        debug!("props state reset");
    }

    pub fn destroy(&self) {
        self.reset_state();
        self.remove_all_listeners();
        self.remove_all_plugins();
    }

    pub fn subscribe(&self) -> UnboundedReceiver<PropsEvent> {
        self.listeners().subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    pub fn remove_all_listeners(&self) {
        self.listeners().clear();
    }

    pub fn use_plugin(&self, plugin: Arc<dyn PropsPlugin>) {
        debug!(plugin = plugin.name(), "plugin attached");
        self.plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plugin);
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins()
            .iter()
            .map(|plugin| plugin.name().to_string())
            .collect()
    }

    pub fn remove_all_plugins(&self) {
        self.plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn emit(&self, event: PropsEvent) {
        self.listeners().emit(event);
    }

    fn plugins(&self) -> Vec<Arc<dyn PropsPlugin>> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> RwLockReadGuard<'_, PropsState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, PropsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
