//! The three binding variants and the contract they share.
//!
//! Every variant keeps `entries` at its fixed arity: missing slots are empty
//! strings and surplus values from the backing source are dropped.

use super::category::{OriginHint, CUSTOM_CATEGORY};
use super::error::{KeybindingError, KeybindingErrorCode, KeybindingResult};
use crate::settings::Settings;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const STATIC_ARITY: usize = 3;
pub const SPICE_ARITY: usize = 2;
pub const CUSTOM_ARITY: usize = 1;

pub const SPICE_VALUE_SEPARATOR: &str = "::";

/// Stable handle for a binding owned by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Static,
    Spice,
    Custom,
}

pub fn fit_entries<I>(values: I, arity: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut entries: Vec<String> = values.into_iter().take(arity).collect();
    entries.resize(arity, String::new());
    entries
}

fn compact(entries: &[String]) -> Vec<String> {
    entries.iter().filter(|e| !e.is_empty()).cloned().collect()
}

pub trait KeyBinding {
    fn label(&self) -> &str;
    fn category(&self) -> &str;
    fn entries(&self) -> &[String];
    fn entries_mut(&mut self) -> &mut Vec<String>;
    fn persist(&mut self) -> KeybindingResult<()>;

    fn origin(&self) -> Option<&OriginHint> {
        None
    }

    fn arity(&self) -> usize {
        self.entries().len()
    }

    /// Writes one slot in memory. Returns whether the value changed.
    fn set_slot(&mut self, slot: usize, accel: &str) -> KeybindingResult<bool> {
        let arity = self.arity();
        let Some(entry) = self.entries_mut().get_mut(slot) else {
            return Err(KeybindingError::new(
                KeybindingErrorCode::InvalidSlot,
                format!("slot {slot} is out of range for a binding with {arity} slots"),
            ));
        };
        if entry == accel {
            return Ok(false);
        }
        *entry = accel.to_string();
        Ok(true)
    }
}

/// Only bindings backed by a schema have a declared default to go back to.
pub trait Resettable {
    fn reset_defaults(&mut self) -> KeybindingResult<()>;
}

#[derive(Clone)]
pub struct StaticBinding {
    label: String,
    category: String,
    settings: Settings,
    key: String,
    entries: Vec<String>,
}

impl StaticBinding {
    pub fn load(
        label: &str,
        category: &str,
        settings: Settings,
        key: &str,
    ) -> KeybindingResult<Self> {
        let mut binding = Self {
            label: label.to_string(),
            category: category.to_string(),
            settings,
            key: key.to_string(),
            entries: fit_entries(Vec::new(), STATIC_ARITY),
        };
        binding.reload()?;
        Ok(binding)
    }

    pub fn schema_id(&self) -> &str {
        self.settings.scope().schema_id()
    }

    pub fn store_key(&self) -> &str {
        &self.key
    }

    /// Re-reads the store. Returns whether the entries changed.
    pub fn reload(&mut self) -> KeybindingResult<bool> {
        let stored = self.settings.get_strv(&self.key)?;
        let entries = fit_entries(stored, STATIC_ARITY);
        let changed = entries != self.entries;
        self.entries = entries;
        Ok(changed)
    }
}

impl KeyBinding for StaticBinding {
    fn label(&self) -> &str {
        &self.label
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Vec<String> {
        &mut self.entries
    }

    fn persist(&mut self) -> KeybindingResult<()> {
        self.settings.set_strv(&self.key, &compact(&self.entries))?;
        self.reload()?;
        Ok(())
    }
}

impl Resettable for StaticBinding {
    fn reset_defaults(&mut self) -> KeybindingResult<()> {
        self.settings.reset(&self.key)?;
        self.reload()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SpiceBinding {
    label: String,
    category: String,
    file: PathBuf,
    json_key: String,
    origin: OriginHint,
    entries: Vec<String>,
}

impl SpiceBinding {
    pub fn new(
        label: &str,
        category: &str,
        file: PathBuf,
        json_key: &str,
        origin: OriginHint,
        packed_value: &str,
    ) -> Self {
        Self {
            label: label.to_string(),
            category: category.to_string(),
            file,
            json_key: json_key.to_string(),
            origin,
            entries: unpack_spice_value(packed_value),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn json_key(&self) -> &str {
        &self.json_key
    }

    pub fn uuid(&self) -> &str {
        &self.origin.uuid
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.origin.instance_id.as_deref()
    }

    pub fn packed_value(&self) -> String {
        self.entries.join(SPICE_VALUE_SEPARATOR)
    }
}

pub fn unpack_spice_value(packed: &str) -> Vec<String> {
    if packed.is_empty() {
        return fit_entries(Vec::new(), SPICE_ARITY);
    }
    fit_entries(
        packed.split(SPICE_VALUE_SEPARATOR).map(str::to_string),
        SPICE_ARITY,
    )
}

impl KeyBinding for SpiceBinding {
    fn label(&self) -> &str {
        &self.label
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Vec<String> {
        &mut self.entries
    }

    fn origin(&self) -> Option<&OriginHint> {
        Some(&self.origin)
    }

    /// Rewrites the one `value` field in the plugin's JSON file, leaving every
    /// other key where it was.
    fn persist(&mut self) -> KeybindingResult<()> {
        let raw = fs::read_to_string(&self.file).map_err(|error| {
            KeybindingError::from_io_error(
                KeybindingErrorCode::WriteFailed,
                format!("Failed to read {}", self.file.display()),
                error,
            )
        })?;
        let mut root: Map<String, Value> = serde_json::from_str(&raw).map_err(|error| {
            KeybindingError::from_external_message(format!(
                "Failed to parse {}: {error}",
                self.file.display()
            ))
        })?;
        let Some(Value::Object(entry)) = root.get_mut(&self.json_key) else {
            return Err(KeybindingError::new(
                KeybindingErrorCode::MalformedData,
                format!(
                    "{} in {} is not a keybinding",
                    self.json_key,
                    self.file.display()
                ),
            ));
        };
        entry.insert("value".to_string(), Value::String(self.packed_value()));
        let payload = serde_json::to_string_pretty(&root).map_err(|error| {
            KeybindingError::from_external_message(format!(
                "Failed to serialize {}: {error}",
                self.file.display()
            ))
        })?;
        fs::write(&self.file, payload).map_err(|error| {
            KeybindingError::from_io_error(
                KeybindingErrorCode::WriteFailed,
                format!("Failed to write {}", self.file.display()),
                error,
            )
        })
    }
}

#[derive(Clone)]
pub struct CustomBinding {
    path_id: String,
    label: String,
    command: String,
    settings: Settings,
    entries: Vec<String>,
}

impl CustomBinding {
    pub fn load(path_id: &str, settings: Settings) -> KeybindingResult<Self> {
        let mut binding = Self {
            path_id: path_id.to_string(),
            label: String::new(),
            command: String::new(),
            settings,
            entries: fit_entries(Vec::new(), CUSTOM_ARITY),
        };
        binding.reload()?;
        Ok(binding)
    }

    pub fn path_id(&self) -> &str {
        &self.path_id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_details(&mut self, name: &str, command: &str) {
        self.label = name.to_string();
        self.command = command.to_string();
    }

    pub fn reload(&mut self) -> KeybindingResult<bool> {
        let label = self.settings.get_string("name")?;
        let command = self.settings.get_string("command")?;
        let entries = fit_entries(self.settings.get_strv("binding")?, CUSTOM_ARITY);
        let changed = label != self.label || command != self.command || entries != self.entries;
        self.label = label;
        self.command = command;
        self.entries = entries;
        Ok(changed)
    }

    /// Returns the path-scoped instance to its defaults.
    pub fn erase(&mut self) -> KeybindingResult<()> {
        for key in ["name", "command", "binding"] {
            self.settings.reset(key)?;
        }
        self.reload()?;
        Ok(())
    }
}

impl KeyBinding for CustomBinding {
    fn label(&self) -> &str {
        &self.label
    }

    fn category(&self) -> &str {
        CUSTOM_CATEGORY
    }

    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Vec<String> {
        &mut self.entries
    }

    fn persist(&mut self) -> KeybindingResult<()> {
        self.settings.set_string("name", &self.label)?;
        self.settings.set_string("command", &self.command)?;
        self.settings.set_strv("binding", &compact(&self.entries))?;
        Ok(())
    }
}

#[derive(Clone)]
pub enum Binding {
    Static(StaticBinding),
    Spice(SpiceBinding),
    Custom(CustomBinding),
}

macro_rules! each_variant {
    ($value:expr, $binding:ident => $body:expr) => {
        match $value {
            Binding::Static($binding) => $body,
            Binding::Spice($binding) => $body,
            Binding::Custom($binding) => $body,
        }
    };
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Static(_) => BindingKind::Static,
            Self::Spice(_) => BindingKind::Spice,
            Self::Custom(_) => BindingKind::Custom,
        }
    }

    pub fn as_static(&self) -> Option<&StaticBinding> {
        match self {
            Self::Static(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_spice(&self) -> Option<&SpiceBinding> {
        match self {
            Self::Spice(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomBinding> {
        match self {
            Self::Custom(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_custom_mut(&mut self) -> Option<&mut CustomBinding> {
        match self {
            Self::Custom(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_resettable_mut(&mut self) -> Option<&mut dyn Resettable> {
        match self {
            Self::Static(binding) => Some(binding),
            Self::Spice(_) | Self::Custom(_) => None,
        }
    }

    /// Re-reads the store for store-backed variants. Spice bindings are
    /// rebuilt by their loader instead.
    pub fn reload(&mut self) -> KeybindingResult<bool> {
        match self {
            Self::Static(binding) => binding.reload(),
            Self::Custom(binding) => binding.reload(),
            Self::Spice(_) => Ok(false),
        }
    }
}

impl KeyBinding for Binding {
    fn label(&self) -> &str {
        each_variant!(self, b => b.label())
    }

    fn category(&self) -> &str {
        each_variant!(self, b => b.category())
    }

    fn entries(&self) -> &[String] {
        each_variant!(self, b => b.entries())
    }

    fn entries_mut(&mut self) -> &mut Vec<String> {
        each_variant!(self, b => b.entries_mut())
    }

    fn persist(&mut self) -> KeybindingResult<()> {
        each_variant!(self, b => b.persist())
    }

    fn origin(&self) -> Option<&OriginHint> {
        each_variant!(self, b => b.origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_fitted_to_arity() {
        assert_eq!(fit_entries(vec!["a".to_string()], 3), vec!["a", "", ""]);
        assert_eq!(
            fit_entries(["a", "b", "c", "d"].map(String::from), 3),
            vec!["a", "b", "c"]
        );
        assert_eq!(fit_entries(Vec::new(), 1), vec![""]);
    }

    #[test]
    fn spice_values_unpack_into_two_slots() {
        assert_eq!(unpack_spice_value("<Super>a::<Super>b"), vec!["<Super>a", "<Super>b"]);
        assert_eq!(unpack_spice_value("<Super>a"), vec!["<Super>a", ""]);
        assert_eq!(unpack_spice_value(""), vec!["", ""]);
        assert_eq!(unpack_spice_value("::<Super>b"), vec!["", "<Super>b"]);
        assert_eq!(unpack_spice_value("a::b::c"), vec!["a", "b"]);
    }

    #[test]
    fn set_slot_rejects_out_of_range() {
        let origin = OriginHint {
            uuid: "x@y".into(),
            instance_id: None,
            highlightable: false,
        };
        let mut binding =
            SpiceBinding::new("Toggle", "x@y", PathBuf::from("/nonexistent"), "toggle", origin, "");
        assert!(binding.set_slot(1, "<Super>t").unwrap());
        assert!(!binding.set_slot(1, "<Super>t").unwrap());
        let err = binding.set_slot(2, "<Super>t").unwrap_err();
        assert_eq!(err.code(), KeybindingErrorCode::InvalidSlot);
        assert_eq!(binding.packed_value(), "::<Super>t");
    }
}
