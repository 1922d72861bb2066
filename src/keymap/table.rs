//! The merged keybinding table.
//!
//! Owns every binding from the three sources, keeps the collision index in
//! step with each mutation, and re-runs exactly one loader when its source
//! reports a change. All work happens on the caller's thread; `poll` is the
//! hook for the host event loop.

use super::accelerator::{normalize, same_accelerator};
use super::binding::{fit_entries, Binding, BindingKey, KeyBinding, SpiceBinding, CUSTOM_ARITY};
use super::category::Category;
use super::collision::CollisionIndex;
use super::error::{KeybindingError, KeybindingErrorCode, KeybindingResult};
use super::events::{Callback, EventKind, SubscriptionId, Subscribers, TableEvent};
use super::loaders::{
    compare_instance_ids, custom_category, custom_ids, load_custom, load_custom_binding,
    load_static, next_custom_id, scan_spices, toggle_sentinel, SourceBatch, SpiceKind,
};
use super::model::{desktop_schema_defaults, CUSTOM_LIST_KEY, KEYBINDINGS_SCHEMA, SHELL_SCHEMA};
use super::resolver::{ConflictResolver, Reassignment};
use crate::config::TableConfig;
use crate::settings::{SchemaCache, Scope, SettingChange, Settings, SettingsStore};
use crate::shell_bus::ShellBus;
use crate::watcher::DirWatchSet;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

const CUSTOM_FIELDS: [&str; 3] = ["name", "command", "binding"];

type WatchedKey = (Scope, String);

pub struct KeybindingTable {
    config: TableConfig,
    cache: SchemaCache,
    bus: Box<dyn ShellBus>,
    bindings: BTreeMap<BindingKey, Binding>,
    next_key: u64,
    static_categories: Vec<Category>,
    custom_category: Category,
    spice_categories: Vec<Category>,
    spice_keys: Vec<BindingKey>,
    index: CollisionIndex,
    store_tx: Sender<SettingChange>,
    store_rx: Receiver<SettingChange>,
    subscribed: HashSet<WatchedKey>,
    watched: HashMap<WatchedKey, BindingKey>,
    dir_watches: DirWatchSet,
    pending_spices: BTreeMap<String, Vec<PathBuf>>,
    subscribers: Subscribers,
    collisions_checked: bool,
}

fn unknown_binding(key: BindingKey) -> KeybindingError {
    KeybindingError::new(
        KeybindingErrorCode::UnknownBinding,
        format!("no binding with key {}", key.0),
    )
}

fn push_spice_value(bus: &mut dyn ShellBus, spice: &SpiceBinding) {
    if !bus.is_running() {
        debug!("shell not running, {} update stays on disk", spice.uuid());
        return;
    }
    let payload = match serde_json::to_string(&Value::String(spice.packed_value())) {
        Ok(payload) => payload,
        Err(error) => {
            warn!("cannot encode {} value: {error}", spice.json_key());
            return;
        }
    };
    if let Err(error) =
        bus.update_setting(spice.uuid(), spice.instance_id(), spice.json_key(), &payload)
    {
        debug!("shell did not take {} update: {error}", spice.uuid());
    }
}

impl KeybindingTable {
    pub fn open(config: TableConfig, bus: Box<dyn ShellBus>) -> KeybindingResult<Self> {
        let store = SettingsStore::open(&config.database, desktop_schema_defaults())?;
        Ok(Self::new(config, Rc::new(store), bus))
    }

    /// Loads all three sources and builds the collision index once.
    pub fn new(config: TableConfig, store: Rc<SettingsStore>, bus: Box<dyn ShellBus>) -> Self {
        let (store_tx, store_rx) = mpsc::channel();
        let dir_watches = DirWatchSet::new(config.debounce);
        let mut table = Self {
            config,
            cache: SchemaCache::new(store),
            bus,
            bindings: BTreeMap::new(),
            next_key: 0,
            static_categories: Vec::new(),
            custom_category: custom_category(),
            spice_categories: Vec::new(),
            spice_keys: Vec::new(),
            index: CollisionIndex::new(),
            store_tx,
            store_rx,
            subscribed: HashSet::new(),
            watched: HashMap::new(),
            dir_watches,
            pending_spices: BTreeMap::new(),
            subscribers: Subscribers::new(),
            collisions_checked: false,
        };

        let batch = load_static(&mut table.cache);
        let (categories, keys) = table.absorb(batch);
        table.static_categories = categories;
        for key in keys {
            table.watch_binding(key);
        }

        let parent = table.custom_parent();
        let batch = load_custom(&mut table.cache, &parent);
        let (categories, keys) = table.absorb(batch);
        if let Some(category) = categories.into_iter().next() {
            table.custom_category = category;
        }
        for key in keys {
            table.watch_binding(key);
        }

        let shell = table.shell_settings();
        let scan = scan_spices(&table.config.spice_paths, &shell);
        let (categories, keys) = table.absorb(scan.batch);
        table.spice_categories = categories;
        table.spice_keys = keys;
        table.pending_spices = scan.pending;
        table.rearm_dir_watches();

        table.index = CollisionIndex::build(
            table
                .bindings
                .iter()
                .map(|(key, binding)| (*key, binding.entries())),
        );

        table.watch_source(Scope::schema(KEYBINDINGS_SCHEMA), CUSTOM_LIST_KEY);
        for kind in SpiceKind::ALL {
            table.watch_source(Scope::schema(SHELL_SCHEMA), kind.enabled_key());
        }

        info!(
            "keybinding table loaded: {} bindings, {} accelerators in use",
            table.bindings.len(),
            table.index.len()
        );
        table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn store(&self) -> &Rc<SettingsStore> {
        self.cache.store()
    }

    /// Every category: static roots first, then custom, then spices.
    pub fn main_store(&self) -> Vec<&Category> {
        self.static_categories
            .iter()
            .chain(std::iter::once(&self.custom_category))
            .chain(self.spice_categories.iter())
            .collect()
    }

    pub fn binding(&self, key: BindingKey) -> Option<&Binding> {
        self.bindings.get(&key)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingKey, &Binding)> {
        self.bindings.iter().map(|(key, binding)| (*key, binding))
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.main_store().into_iter().find(|category| category.id == id)
    }

    pub fn bindings_in(&self, category_id: &str) -> Vec<(BindingKey, &Binding)> {
        let Some(category) = self.category(category_id) else {
            return Vec::new();
        };
        category
            .bindings
            .iter()
            .filter_map(|key| self.bindings.get(key).map(|binding| (*key, binding)))
            .collect()
    }

    pub fn children_of(&self, category_id: &str) -> Vec<&Category> {
        self.main_store()
            .into_iter()
            .filter(|category| category.parent_id.as_deref() == Some(category_id))
            .collect()
    }

    pub fn holders_of(&self, accel: &str) -> Vec<BindingKey> {
        self.index.holders(accel)
    }

    pub fn collision_index(&self) -> &CollisionIndex {
        &self.index
    }

    pub fn find_static(&self, schema: &str, key: &str) -> Option<BindingKey> {
        self.bindings.iter().find_map(|(binding_key, binding)| {
            binding
                .as_static()
                .filter(|b| b.schema_id() == schema && b.store_key() == key)
                .map(|_| *binding_key)
        })
    }

    pub fn find_custom(&self, path_id: &str) -> Option<BindingKey> {
        self.custom_category.bindings.iter().copied().find(|key| {
            self.bindings
                .get(key)
                .and_then(Binding::as_custom)
                .is_some_and(|custom| custom.path_id() == path_id)
        })
    }

    /// Uuids whose config files have not all appeared yet.
    pub fn pending_spices(&self) -> Vec<&str> {
        self.pending_spices.keys().map(String::as_str).collect()
    }

    pub fn dir_watches(&self) -> &DirWatchSet {
        &self.dir_watches
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: Callback) -> SubscriptionId {
        self.subscribers.subscribe(kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Writes `accel` into `slot` of `key`. Any other binding that holds the
    /// same combination under a different label is only stripped of it once
    /// `resolver` confirms. Returns `Ok(false)` when the user declines.
    ///
    /// An empty `accel` clears the slot. A combination already held by
    /// another slot of `key` moves to `slot`. Text that does not parse is a
    /// `MalformedData` error and leaves the binding untouched.
    pub fn maybe_update_binding(
        &mut self,
        key: BindingKey,
        accel: &str,
        slot: usize,
        resolver: &mut dyn ConflictResolver,
    ) -> KeybindingResult<bool> {
        let binding = self.bindings.get(&key).ok_or_else(|| unknown_binding(key))?;
        if slot >= binding.arity() {
            return Err(KeybindingError::new(
                KeybindingErrorCode::InvalidSlot,
                format!(
                    "slot {slot} is out of range for {} ({} slots)",
                    binding.label(),
                    binding.arity()
                ),
            ));
        }
        let label = binding.label().to_string();
        if accel.trim().is_empty() {
            self.clear_binding(key, slot)?;
            return Ok(true);
        }
        let canonical = normalize(accel);
        if canonical.is_empty() {
            return Err(KeybindingError::new(
                KeybindingErrorCode::MalformedData,
                format!("{accel:?} is not a key combination"),
            ));
        }

        let holders: Vec<BindingKey> = self
            .index
            .holders(&canonical)
            .into_iter()
            .filter(|holder| *holder != key)
            .filter(|holder| {
                self.bindings
                    .get(holder)
                    .is_some_and(|other| other.label() != label)
            })
            .collect();

        for holder in &holders {
            let current_holder = self
                .bindings
                .get(holder)
                .map(|other| other.label().to_string())
                .unwrap_or_default();
            let request = Reassignment {
                accelerator: canonical.clone(),
                current_holder,
                requested_by: label.clone(),
            };
            if !resolver.confirm_reassign(&request) {
                debug!("reassignment of {canonical} to {label} declined");
                return Ok(false);
            }
        }

        for holder in holders {
            self.strip_accelerator(holder, &canonical)?;
        }

        let binding = self.bindings.get_mut(&key).ok_or_else(|| unknown_binding(key))?;
        let duplicates: Vec<usize> = binding
            .entries()
            .iter()
            .enumerate()
            .filter(|(other, entry)| *other != slot && same_accelerator(entry, &canonical))
            .map(|(other, _)| other)
            .collect();
        let mut changed = false;
        for other in duplicates {
            changed |= binding.set_slot(other, "")?;
        }
        changed |= binding.set_slot(slot, &canonical)?;
        if changed {
            self.commit(key)?;
        }
        info!("{canonical} assigned to {label}");
        Ok(true)
    }

    /// Empties one slot. Clearing an empty slot changes nothing.
    pub fn clear_binding(&mut self, key: BindingKey, slot: usize) -> KeybindingResult<()> {
        let binding = self.bindings.get_mut(&key).ok_or_else(|| unknown_binding(key))?;
        if binding.set_slot(slot, "")? {
            self.commit(key)?;
        }
        Ok(())
    }

    /// Restores the schema default of a static binding. Spice and custom
    /// bindings have no default; for them this returns `Ok(false)` and
    /// changes nothing.
    pub fn reset_bindings(&mut self, key: BindingKey) -> KeybindingResult<bool> {
        let binding = self.bindings.get_mut(&key).ok_or_else(|| unknown_binding(key))?;
        let before = binding.entries().to_vec();
        let label = binding.label().to_string();
        let Some(resettable) = binding.as_resettable_mut() else {
            debug!("{label} has no default to reset to");
            return Ok(false);
        };
        resettable.reset_defaults()?;
        if binding.entries() != before.as_slice() {
            self.index.reindex(key, binding.entries());
            self.subscribers.emit(&TableEvent::BindingChanged(key));
        }
        Ok(true)
    }

    pub fn add_custom_keybinding(&mut self, name: &str, command: &str) -> KeybindingResult<BindingKey> {
        let parent = self.custom_parent();
        let mut list = parent.get_strv(CUSTOM_LIST_KEY)?;
        let path_id = next_custom_id(&list);

        let mut binding = load_custom_binding(&mut self.cache, &path_id)?;
        binding.set_details(name, command);
        *binding.entries_mut() = fit_entries(Vec::new(), CUSTOM_ARITY);
        binding.persist()?;

        list.push(path_id.clone());
        toggle_sentinel(&mut list);
        parent.set_strv(CUSTOM_LIST_KEY, &list)?;

        let key = self.insert_binding(Binding::Custom(binding));
        self.custom_category.bindings.push(key);
        if let Some(binding) = self.bindings.get(&key) {
            self.index.insert(key, binding.entries());
        }
        self.watch_binding(key);
        info!("added custom keybinding {path_id} ({name})");
        self.subscribers.emit(&TableEvent::CustomsChanged);
        Ok(key)
    }

    pub fn update_custom_keybinding(
        &mut self,
        key: BindingKey,
        name: &str,
        command: &str,
    ) -> KeybindingResult<bool> {
        let custom = self
            .bindings
            .get_mut(&key)
            .and_then(Binding::as_custom_mut)
            .ok_or_else(|| unknown_binding(key))?;
        if custom.label() == name && custom.command() == command {
            return Ok(false);
        }
        custom.set_details(name, command);
        custom.persist()?;
        self.subscribers.emit(&TableEvent::BindingChanged(key));
        Ok(true)
    }

    pub fn remove_custom_keybinding(&mut self, key: BindingKey) -> KeybindingResult<()> {
        let custom = self
            .bindings
            .get_mut(&key)
            .and_then(Binding::as_custom_mut)
            .ok_or_else(|| unknown_binding(key))?;
        custom.erase()?;
        let path_id = custom.path_id().to_string();

        let parent = self.custom_parent();
        let mut list = parent.get_strv(CUSTOM_LIST_KEY)?;
        list.retain(|id| *id != path_id);
        toggle_sentinel(&mut list);
        parent.set_strv(CUSTOM_LIST_KEY, &list)?;

        self.drop_binding(key);
        self.custom_category.bindings.retain(|k| *k != key);
        info!("removed custom keybinding {path_id}");
        self.subscribers.emit(&TableEvent::CustomsChanged);
        Ok(())
    }

    /// Asks the resolver to settle every accelerator shared by two or more
    /// bindings. Only the first call per table does anything. Returns the
    /// number of bindings that lost an accelerator.
    pub fn check_for_collisions(
        &mut self,
        resolver: &mut dyn ConflictResolver,
    ) -> KeybindingResult<usize> {
        if self.collisions_checked {
            return Ok(0);
        }
        self.collisions_checked = true;

        let mut cleared = 0;
        for (accel, holders) in self.index.collisions() {
            let groups = self.collision_groups(&holders);
            if groups.len() < 2 {
                continue;
            }
            let labels: Vec<&str> = groups
                .iter()
                .filter_map(|(representative, _)| self.bindings.get(representative))
                .map(|binding| binding.label())
                .collect();
            let Some(survivor) = resolver.choose_survivor(&accel, &labels) else {
                debug!("collision on {accel} left unresolved");
                continue;
            };
            for (position, (_, members)) in groups.into_iter().enumerate() {
                if position == survivor {
                    continue;
                }
                for member in members {
                    self.strip_accelerator(member, &accel)?;
                    cleared += 1;
                }
            }
        }
        if cleared > 0 {
            info!("collision check cleared {cleared} bindings");
        }
        Ok(cleared)
    }

    pub fn highlight_spice(&mut self, uuid: &str, instance_id: Option<&str>, on: bool) {
        if !self.bus.is_running() {
            debug!("shell not running, not highlighting {uuid}");
            return;
        }
        if let Err(error) = self.bus.highlight_xlet(uuid, instance_id, on) {
            debug!("highlight of {uuid} failed: {error}");
        }
    }

    /// Records a settled change under a watched spice directory, as its
    /// watcher does once events there have been quiet for the debounce delay.
    pub fn note_dir_event(&mut self, path: &Path) {
        self.dir_watches.report(path);
    }

    /// Applies pending store changes, then reloads spices once if the
    /// enabled lists or a watched spice directory changed.
    pub fn poll(&mut self) {
        let mut seen: HashSet<WatchedKey> = HashSet::new();
        let mut reload_customs = false;
        let mut reload_spices = false;
        let changes: Vec<SettingChange> = self.store_rx.try_iter().collect();
        for change in changes {
            let watched: WatchedKey = (change.scope, change.key);
            if !seen.insert(watched.clone()) {
                continue;
            }
            let (scope, key) = &watched;
            if scope.schema_id() == KEYBINDINGS_SCHEMA && key == CUSTOM_LIST_KEY {
                reload_customs = true;
            } else if scope.schema_id() == SHELL_SCHEMA
                && SpiceKind::ALL.iter().any(|kind| kind.enabled_key() == key)
            {
                reload_spices = true;
            } else if let Some(binding_key) = self.watched.get(&watched).copied() {
                self.reload_binding(binding_key);
            }
        }

        if reload_customs {
            self.reconcile_customs();
        }

        let fired = self.dir_watches.drain();
        let vanished = self.dir_watches.prune_missing();
        if !fired.is_empty() || !vanished.is_empty() {
            debug!(
                "{} spice directories changed, {} vanished",
                fired.len(),
                vanished.len()
            );
            reload_spices = true;
        }
        if reload_spices {
            self.reload_spices();
        }
    }

    fn custom_parent(&mut self) -> Settings {
        self.cache.handle(&Scope::schema(KEYBINDINGS_SCHEMA))
    }

    fn shell_settings(&mut self) -> Settings {
        self.cache.handle(&Scope::schema(SHELL_SCHEMA))
    }

    fn insert_binding(&mut self, binding: Binding) -> BindingKey {
        let key = BindingKey(self.next_key);
        self.next_key += 1;
        self.bindings.insert(key, binding);
        key
    }

    /// Gives every binding a key and files it under its category.
    fn absorb(&mut self, batch: SourceBatch) -> (Vec<Category>, Vec<BindingKey>) {
        let SourceBatch {
            mut categories,
            bindings,
        } = batch;
        let mut keys = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let category_id = binding.category().to_string();
            let key = self.insert_binding(binding);
            match categories.iter_mut().find(|c| c.id == category_id) {
                Some(category) => category.bindings.push(key),
                None => warn!("binding filed under unknown category {category_id}"),
            }
            keys.push(key);
        }
        (categories, keys)
    }

    fn drop_binding(&mut self, key: BindingKey) {
        self.bindings.remove(&key);
        self.index.remove(key);
        self.watched.retain(|_, watched| *watched != key);
    }

    fn watch_source(&mut self, scope: Scope, key: &str) {
        let watched = (scope, key.to_string());
        if self.subscribed.insert(watched.clone()) {
            self.cache
                .store()
                .subscribe(&watched.0, &watched.1, self.store_tx.clone());
        }
    }

    fn watch_binding(&mut self, key: BindingKey) {
        let targets: Vec<WatchedKey> = match self.bindings.get(&key) {
            Some(Binding::Static(binding)) => vec![(
                Scope::schema(binding.schema_id()),
                binding.store_key().to_string(),
            )],
            Some(Binding::Custom(binding)) => CUSTOM_FIELDS
                .iter()
                .map(|field| (binding.settings().scope().clone(), field.to_string()))
                .collect(),
            Some(Binding::Spice(_)) | None => Vec::new(),
        };
        for (scope, field) in targets {
            self.watch_source(scope.clone(), &field);
            self.watched.insert((scope, field), key);
        }
    }

    fn reload_binding(&mut self, key: BindingKey) {
        let Some(binding) = self.bindings.get_mut(&key) else {
            return;
        };
        match binding.reload() {
            Ok(true) => {
                self.index.reindex(key, binding.entries());
                self.subscribers.emit(&TableEvent::BindingChanged(key));
            }
            Ok(false) => {}
            Err(error) => warn!("cannot reload {}: {error}", binding.label()),
        }
    }

    /// Persists an in-memory change, then reindexes and notifies.
    fn commit(&mut self, key: BindingKey) -> KeybindingResult<()> {
        let binding = self.bindings.get_mut(&key).ok_or_else(|| unknown_binding(key))?;
        if let Err(error) = binding.persist() {
            if let Err(reload) = binding.reload() {
                warn!("cannot restore {} after failed write: {reload}", binding.label());
            }
            self.index.reindex(key, binding.entries());
            return Err(error);
        }
        self.index.reindex(key, binding.entries());
        if let Binding::Spice(spice) = binding {
            push_spice_value(self.bus.as_mut(), spice);
        }
        self.subscribers.emit(&TableEvent::BindingChanged(key));
        Ok(())
    }

    fn strip_accelerator(&mut self, key: BindingKey, accel: &str) -> KeybindingResult<()> {
        let binding = self.bindings.get_mut(&key).ok_or_else(|| unknown_binding(key))?;
        let slots: Vec<usize> = binding
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| same_accelerator(entry, accel))
            .map(|(slot, _)| slot)
            .collect();
        if slots.is_empty() {
            return Ok(());
        }
        for slot in slots {
            binding.set_slot(slot, "")?;
        }
        info!("{accel} removed from {}", binding.label());
        self.commit(key)
    }

    /// Groups holders of one accelerator for the chooser. Instances of the
    /// same spice form one group, represented by the highest instance id.
    fn collision_groups(&self, holders: &[BindingKey]) -> Vec<(BindingKey, Vec<BindingKey>)> {
        let mut groups: Vec<(BindingKey, Vec<BindingKey>)> = Vec::new();
        let mut by_uuid: HashMap<&str, usize> = HashMap::new();
        for holder in holders {
            let Some(binding) = self.bindings.get(holder) else {
                continue;
            };
            let Some(spice) = binding.as_spice() else {
                groups.push((*holder, vec![*holder]));
                continue;
            };
            let Some(&position) = by_uuid.get(spice.uuid()) else {
                by_uuid.insert(spice.uuid(), groups.len());
                groups.push((*holder, vec![*holder]));
                continue;
            };
            let group = &mut groups[position];
            group.1.push(*holder);
            let current = self
                .bindings
                .get(&group.0)
                .and_then(Binding::as_spice)
                .and_then(SpiceBinding::instance_id);
            if instance_order(spice.instance_id(), current) == Ordering::Greater {
                group.0 = *holder;
            }
        }
        groups
    }

    fn reconcile_customs(&mut self) {
        let parent = self.custom_parent();
        let ids = match custom_ids(&parent) {
            Ok(ids) => ids,
            Err(error) => {
                warn!("custom keybinding list unavailable: {error}");
                return;
            }
        };

        let mut existing: HashMap<String, BindingKey> = self
            .custom_category
            .bindings
            .iter()
            .filter_map(|key| {
                self.bindings
                    .get(key)
                    .and_then(Binding::as_custom)
                    .map(|custom| (custom.path_id().to_string(), *key))
            })
            .collect();

        let mut order = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(key) = existing.remove(&id) {
                order.push(key);
                continue;
            }
            match load_custom_binding(&mut self.cache, &id) {
                Ok(binding) => {
                    let key = self.insert_binding(Binding::Custom(binding));
                    if let Some(binding) = self.bindings.get(&key) {
                        self.index.insert(key, binding.entries());
                    }
                    self.watch_binding(key);
                    order.push(key);
                }
                Err(error) => warn!("skipping custom keybinding {id}: {error}"),
            }
        }
        for key in existing.into_values() {
            self.drop_binding(key);
        }

        if order != self.custom_category.bindings {
            self.custom_category.bindings = order;
            debug!("custom keybinding list reconciled");
            self.subscribers.emit(&TableEvent::CustomsChanged);
        }
    }

    /// Drops every spice binding and rescans the enabled spices.
    fn reload_spices(&mut self) {
        let shell = self.shell_settings();
        let scan = scan_spices(&self.config.spice_paths, &shell);

        for key in std::mem::take(&mut self.spice_keys) {
            self.bindings.remove(&key);
            self.index.remove(key);
        }
        let (categories, keys) = self.absorb(scan.batch);
        for key in &keys {
            if let Some(binding) = self.bindings.get(key) {
                self.index.insert(*key, binding.entries());
            }
        }
        self.spice_categories = categories;
        self.spice_keys = keys;
        self.pending_spices = scan.pending;
        self.rearm_dir_watches();
        self.subscribers.emit(&TableEvent::SpicesChanged);
    }

    fn rearm_dir_watches(&mut self) {
        let targets: BTreeSet<PathBuf> = self
            .pending_spices
            .values()
            .flatten()
            .cloned()
            .collect();
        self.dir_watches.retain(&targets);
        for target in &targets {
            if let Err(error) = self.dir_watches.watch_once(target) {
                warn!("cannot watch {}: {error}", target.display());
            }
        }
    }
}

fn instance_order(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => compare_instance_ids(left, right),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
