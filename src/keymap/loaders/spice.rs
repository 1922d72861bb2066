//! Discovers keybindings declared in the settings files of enabled spices.
//!
//! A spice is only loaded once every instance it is enabled with has a
//! config file on disk. Until then it is reported as pending together with
//! the directory worth watching for the missing files.

use super::SourceBatch;
use crate::config::SpicePaths;
use crate::keymap::binding::{Binding, SpiceBinding};
use crate::keymap::category::{Category, OriginHint, SPICES_CATEGORY};
use crate::keymap::error::{KeybindingError, KeybindingErrorCode, KeybindingResult};
use crate::settings::Settings;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpiceKind {
    Applet,
    Desklet,
    Extension,
}

impl SpiceKind {
    pub const ALL: [SpiceKind; 3] = [Self::Applet, Self::Desklet, Self::Extension];

    pub fn enabled_key(self) -> &'static str {
        match self {
            Self::Applet => "enabled-applets",
            Self::Desklet => "enabled-desklets",
            Self::Extension => "enabled-extensions",
        }
    }

    pub fn install_dir(self) -> &'static str {
        match self {
            Self::Applet => "applets",
            Self::Desklet => "desklets",
            Self::Extension => "extensions",
        }
    }

    /// Applets and desklets are addressed per instance by the shell and can
    /// be flashed on screen; extensions cannot.
    pub fn highlightable(self) -> bool {
        !matches!(self, Self::Extension)
    }

    /// `(uuid, instance id)` from one enabled-list entry.
    ///
    /// Applets: `panel:location:order:uuid:instance`, desklets:
    /// `uuid:instance:x:y`, extensions: `uuid`.
    pub fn parse_enabled_entry(self, entry: &str) -> Option<(String, Option<String>)> {
        let fields: Vec<&str> = entry.split(':').map(str::trim).collect();
        let (uuid, instance) = match self {
            Self::Applet => (*fields.get(3)?, fields.get(4).copied()),
            Self::Desklet => (*fields.first()?, fields.get(1).copied()),
            Self::Extension => (*fields.first()?, None),
        };
        if uuid.is_empty() {
            return None;
        }
        let instance = instance.filter(|id| !id.is_empty()).map(str::to_string);
        Some((uuid.to_string(), instance))
    }
}

/// Numeric ids first, in numeric order, then every other id lexically.
pub fn compare_instance_ids(left: &str, right: &str) -> Ordering {
    fn sort_key(id: &str) -> (bool, u64, &str) {
        match id.parse::<u64>() {
            Ok(number) => (false, number, id),
            Err(_) => (true, 0, id),
        }
    }
    sort_key(left).cmp(&sort_key(right))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledSpice {
    pub kind: SpiceKind,
    pub uuid: String,
    pub instance_ids: Vec<String>,
}

impl EnabledSpice {
    /// Config file stems: one per instance, or the uuid for single-instance
    /// spices.
    fn config_stems(&self) -> Vec<String> {
        if self.instance_ids.is_empty() {
            vec![self.uuid.clone()]
        } else {
            self.instance_ids.clone()
        }
    }
}

pub fn enabled_spices(shell: &Settings) -> Vec<EnabledSpice> {
    let mut grouped: BTreeMap<(SpiceKind, String), Vec<String>> = BTreeMap::new();
    for kind in SpiceKind::ALL {
        let entries = match shell.get_strv(kind.enabled_key()) {
            Ok(entries) => entries,
            Err(error) => {
                warn!("cannot read {}: {error}", kind.enabled_key());
                continue;
            }
        };
        for entry in entries {
            let Some((uuid, instance)) = kind.parse_enabled_entry(&entry) else {
                debug!("ignoring malformed {} entry {entry:?}", kind.enabled_key());
                continue;
            };
            let instances = grouped.entry((kind, uuid)).or_default();
            if let Some(instance) = instance {
                if !instances.contains(&instance) {
                    instances.push(instance);
                }
            }
        }
    }

    grouped
        .into_iter()
        .map(|((kind, uuid), mut instance_ids)| {
            instance_ids.sort_by(|a, b| compare_instance_ids(a, b));
            EnabledSpice {
                kind,
                uuid,
                instance_ids,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Complete(Vec<(String, PathBuf)>),
    Pending {
        found: usize,
        expected: usize,
        watch: Vec<PathBuf>,
    },
}

/// Finds one config file per expected instance. A file under the current
/// root shadows the same file under the legacy root.
pub fn discover(paths: &SpicePaths, spice: &EnabledSpice) -> Discovery {
    let current_dir = paths.config_root.join(&spice.uuid);
    let legacy_dir = paths.legacy_config_root.join(&spice.uuid);
    let stems = spice.config_stems();
    let expected = stems.len();

    let mut files = Vec::with_capacity(expected);
    for stem in stems {
        let name = format!("{stem}.json");
        let found = [current_dir.join(&name), legacy_dir.join(&name)]
            .into_iter()
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            files.push((stem, path));
        }
    }

    if files.len() < expected {
        let watch = [
            (current_dir, &paths.config_root),
            (legacy_dir, &paths.legacy_config_root),
        ]
        .into_iter()
        .filter_map(|(own, root)| {
            if own.is_dir() {
                Some(own)
            } else {
                root.is_dir().then(|| root.clone())
            }
        })
        .collect();
        return Discovery::Pending {
            found: files.len(),
            expected,
            watch,
        };
    }
    Discovery::Complete(files)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiceKeybinding {
    pub key: String,
    pub description: String,
    pub value: String,
}

/// Keybinding-typed entries of one config file, in file order.
pub fn parse_config_file(path: &Path) -> KeybindingResult<Vec<SpiceKeybinding>> {
    let raw = fs::read_to_string(path).map_err(|error| {
        KeybindingError::from_io_error(
            KeybindingErrorCode::SourceUnavailable,
            format!("Failed to read {}", path.display()),
            error,
        )
    })?;
    let root: Value = serde_json::from_str(&raw).map_err(|error| {
        KeybindingError::from_external_message(format!(
            "Failed to parse {}: {error}",
            path.display()
        ))
    })?;
    let Value::Object(root) = root else {
        return Err(KeybindingError::new(
            KeybindingErrorCode::MalformedData,
            format!("{} is not a JSON object", path.display()),
        ));
    };

    Ok(root
        .iter()
        .filter_map(|(key, value)| keybinding_entry(key, value))
        .collect())
}

fn keybinding_entry(key: &str, value: &Value) -> Option<SpiceKeybinding> {
    let Value::Object(entry) = value else {
        return None;
    };
    if entry.get("type").and_then(Value::as_str) != Some("keybinding") {
        return None;
    }
    Some(SpiceKeybinding {
        key: key.to_string(),
        description: text_field(entry, "description").unwrap_or(key).to_string(),
        value: text_field(entry, "value")
            .or_else(|| text_field(entry, "default"))
            .unwrap_or_default()
            .to_string(),
    })
}

fn text_field<'a>(entry: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    entry.get(field).and_then(Value::as_str)
}

fn display_name(paths: &SpicePaths, spice: &EnabledSpice) -> String {
    for root in &paths.install_roots {
        let metadata = root
            .join(spice.kind.install_dir())
            .join(&spice.uuid)
            .join("metadata.json");
        let Ok(raw) = fs::read_to_string(&metadata) else {
            continue;
        };
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(parsed) => {
                if let Some(name) = parsed.get("name").and_then(Value::as_str) {
                    return name.to_string();
                }
            }
            Err(error) => debug!("unreadable {}: {error}", metadata.display()),
        }
    }
    spice.uuid.clone()
}

#[derive(Default)]
pub struct SpiceScan {
    pub batch: SourceBatch,
    /// Spices still waiting for config files, with the directories to watch.
    pub pending: BTreeMap<String, Vec<PathBuf>>,
}

pub fn scan_spices(paths: &SpicePaths, shell: &Settings) -> SpiceScan {
    let mut scan = SpiceScan::default();
    for spice in enabled_spices(shell) {
        let files = match discover(paths, &spice) {
            Discovery::Complete(files) => files,
            Discovery::Pending {
                found,
                expected,
                watch,
            } => {
                debug!(
                    "deferring {}: {found} of {expected} config files present",
                    spice.uuid
                );
                scan.pending.insert(spice.uuid.clone(), watch);
                continue;
            }
        };

        let mut parsed = Vec::with_capacity(files.len());
        for (instance_id, path) in files {
            match parse_config_file(&path) {
                Ok(entries) if entries.is_empty() => {}
                Ok(entries) => parsed.push((instance_id, path, entries)),
                Err(error) => warn!("skipping {} config: {error}", spice.uuid),
            }
        }
        if parsed.is_empty() {
            continue;
        }
        add_spice(&mut scan.batch, paths, &spice, parsed);
    }
    info!(
        "loaded {} spice keybindings, {} spices pending",
        scan.batch.bindings.len(),
        scan.pending.len()
    );
    scan
}

fn add_spice(
    batch: &mut SourceBatch,
    paths: &SpicePaths,
    spice: &EnabledSpice,
    parsed: Vec<(String, PathBuf, Vec<SpiceKeybinding>)>,
) {
    let highlightable = spice.kind.highlightable();
    let origin = |instance_id: Option<&str>| OriginHint {
        uuid: spice.uuid.clone(),
        instance_id: instance_id.map(str::to_string),
        highlightable,
    };
    let per_instance = parsed.len() > 1;

    let parent_origin = if per_instance {
        origin(None)
    } else {
        origin(parsed.first().map(|(id, _, _)| id.as_str()))
    };
    batch.categories.push(
        Category::new(spice.uuid.as_str(), display_name(paths, spice), Some(SPICES_CATEGORY))
            .with_origin(parent_origin),
    );

    for (position, (instance_id, path, entries)) in parsed.into_iter().enumerate() {
        let category_id = if per_instance {
            let id = format!("{}#{instance_id}", spice.uuid);
            batch.categories.push(
                Category::new(id.as_str(), format!("Instance {}", position + 1), Some(spice.uuid.as_str()))
                    .with_origin(origin(Some(instance_id.as_str()))),
            );
            id
        } else {
            spice.uuid.clone()
        };

        for entry in entries {
            batch.bindings.push(Binding::Spice(SpiceBinding::new(
                &entry.description,
                &category_id,
                path.clone(),
                &entry.key,
                origin(Some(instance_id.as_str())),
                &entry.value,
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enabled_entries_per_kind() {
        assert_eq!(
            SpiceKind::Applet.parse_enabled_entry("panel1:right:3:clock@cinnamon.org:14"),
            Some(("clock@cinnamon.org".to_string(), Some("14".to_string())))
        );
        assert_eq!(
            SpiceKind::Desklet.parse_enabled_entry("photo@cinnamon.org:2:100:40"),
            Some(("photo@cinnamon.org".to_string(), Some("2".to_string())))
        );
        assert_eq!(
            SpiceKind::Extension.parse_enabled_entry("transparent-panels@germanfr"),
            Some(("transparent-panels@germanfr".to_string(), None))
        );
        assert_eq!(SpiceKind::Applet.parse_enabled_entry("panel1:right"), None);
        assert_eq!(SpiceKind::Extension.parse_enabled_entry(""), None);
    }

    #[test]
    fn instance_ids_order_numerically() {
        let mut ids = vec!["10", "9", "abc", "2"];
        ids.sort_by(|a, b| compare_instance_ids(a, b));
        assert_eq!(ids, vec!["2", "9", "10", "abc"]);
    }

    #[test]
    fn mixed_instance_ids_have_one_consistent_order() {
        assert_eq!(compare_instance_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_instance_ids("10", "10a"), Ordering::Less);
        assert_eq!(compare_instance_ids("2", "10a"), Ordering::Less);
        assert_eq!(compare_instance_ids("10a", "2"), Ordering::Greater);

        let mut ids: Vec<String> = (0..40)
            .flat_map(|n| [format!("{n}"), format!("{n}a"), format!("x{n}")])
            .rev()
            .collect();
        ids.sort_by(|a, b| compare_instance_ids(a, b));
        assert_eq!(ids.first().map(String::as_str), Some("0"));
        assert_eq!(ids[39], "39");
        assert_eq!(ids[40], "0a");
        assert!(ids
            .windows(2)
            .all(|pair| compare_instance_ids(&pair[0], &pair[1]) != Ordering::Greater));
    }

    #[test]
    fn pending_spices_watch_both_roots() {
        let dir = std::env::temp_dir().join(format!(
            "cinnamon-keybindings-test-pending-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        let paths = SpicePaths::rooted_at(&dir);
        fs::create_dir_all(&paths.config_root).unwrap();
        fs::create_dir_all(paths.legacy_config_root.join("late@test")).unwrap();
        let spice = EnabledSpice {
            kind: SpiceKind::Applet,
            uuid: "late@test".to_string(),
            instance_ids: vec!["4".to_string()],
        };

        let discovery = discover(&paths, &spice);

        assert_eq!(
            discovery,
            Discovery::Pending {
                found: 0,
                expected: 1,
                watch: vec![
                    paths.config_root.clone(),
                    paths.legacy_config_root.join("late@test"),
                ],
            }
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn only_keybinding_entries_are_kept() {
        let value: Value = serde_json::json!({
            "layout": {"type": "layout", "pages": []},
            "toggle": {"type": "keybinding", "description": "Toggle menu", "value": "<Super>z::"},
            "fallback": {"type": "keybinding", "default": "<Super>y"},
            "plain": 4
        });
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        let entries: Vec<_> = map
            .iter()
            .filter_map(|(key, value)| keybinding_entry(key, value))
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "Toggle menu");
        assert_eq!(entries[0].value, "<Super>z::");
        assert_eq!(entries[1].description, "fallback");
        assert_eq!(entries[1].value, "<Super>y");
    }
}
