use super::{SettingChange, SettingValue, SettingsStore, Scope, StoreResult};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::Sender;

/// A handle bound to one schema instance.
#[derive(Clone)]
pub struct Settings {
    store: Rc<SettingsStore>,
    scope: Scope,
}

impl Settings {
    pub fn new(store: Rc<SettingsStore>, scope: Scope) -> Self {
        Self { store, scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get_string(&self, key: &str) -> StoreResult<String> {
        self.store.get_string(&self.scope, key)
    }

    pub fn set_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.store
            .set(&self.scope, key, SettingValue::String(value.to_string()))
    }

    pub fn get_strv(&self, key: &str) -> StoreResult<Vec<String>> {
        self.store.get_strv(&self.scope, key)
    }

    pub fn set_strv(&self, key: &str, value: &[String]) -> StoreResult<()> {
        self.store
            .set(&self.scope, key, SettingValue::StringList(value.to_vec()))
    }

    pub fn get_int(&self, key: &str) -> StoreResult<i64> {
        self.store.get_int(&self.scope, key)
    }

    pub fn get_bool(&self, key: &str) -> StoreResult<bool> {
        self.store.get_bool(&self.scope, key)
    }

    pub fn reset(&self, key: &str) -> StoreResult<()> {
        self.store.reset(&self.scope, key)
    }

    pub fn subscribe(&self, key: &str, tx: Sender<SettingChange>) {
        self.store.subscribe(&self.scope, key, tx);
    }
}

/// Shares one [`Settings`] handle per scope across every binding that uses it.
pub struct SchemaCache {
    store: Rc<SettingsStore>,
    handles: HashMap<Scope, Settings>,
}

impl SchemaCache {
    pub fn new(store: Rc<SettingsStore>) -> Self {
        Self {
            store,
            handles: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Rc<SettingsStore> {
        &self.store
    }

    pub fn handle(&mut self, scope: &Scope) -> Settings {
        self.handles
            .entry(scope.clone())
            .or_insert_with(|| Settings::new(self.store.clone(), scope.clone()))
            .clone()
    }

    /// Forgets a path-scoped handle once its instance is gone.
    pub fn evict(&mut self, scope: &Scope) {
        self.handles.remove(scope);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
