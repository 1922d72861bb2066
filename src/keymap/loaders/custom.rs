use super::SourceBatch;
use crate::keymap::binding::{Binding, CustomBinding};
use crate::keymap::category::{Category, CUSTOM_CATEGORY};
use crate::keymap::error::KeybindingResult;
use crate::keymap::model::{
    custom_keybinding_path, CUSTOM_KEYBINDING_SCHEMA, CUSTOM_LIST_KEY, CUSTOM_LIST_SENTINEL,
    STATIC_CATEGORIES,
};
use crate::settings::{SchemaCache, Scope, Settings};
use tracing::warn;

pub fn custom_scope(path_id: &str) -> Scope {
    Scope::with_path(CUSTOM_KEYBINDING_SCHEMA, custom_keybinding_path(path_id))
}

/// Ids in list order, without the sentinel or repeats.
pub fn custom_ids(parent: &Settings) -> KeybindingResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();
    for id in parent.get_strv(CUSTOM_LIST_KEY)? {
        if id == CUSTOM_LIST_SENTINEL || id.is_empty() || ids.contains(&id) {
            continue;
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Lowest `customN` not present in `list`; gaps are reused.
pub fn next_custom_id(list: &[String]) -> String {
    (0..)
        .map(|n| format!("custom{n}"))
        .find(|candidate| !list.contains(candidate))
        .unwrap_or_default()
}

pub fn toggle_sentinel(list: &mut Vec<String>) {
    if list.iter().any(|id| id == CUSTOM_LIST_SENTINEL) {
        list.retain(|id| id != CUSTOM_LIST_SENTINEL);
    } else {
        list.push(CUSTOM_LIST_SENTINEL.to_string());
    }
}

pub fn load_custom_binding(cache: &mut SchemaCache, path_id: &str) -> KeybindingResult<CustomBinding> {
    let settings = cache.handle(&custom_scope(path_id));
    CustomBinding::load(path_id, settings)
}

pub fn custom_category() -> Category {
    let (label, icon) = STATIC_CATEGORIES
        .iter()
        .find(|def| def.id == CUSTOM_CATEGORY)
        .map(|def| (def.label, def.icon))
        .unwrap_or(("Custom Shortcuts", "applications-other"));
    Category::new(CUSTOM_CATEGORY, label, None).with_icon(icon)
}

pub fn load_custom(cache: &mut SchemaCache, parent: &Settings) -> SourceBatch {
    let ids = match custom_ids(parent) {
        Ok(ids) => ids,
        Err(error) => {
            warn!("custom keybinding list unavailable: {error}");
            Vec::new()
        }
    };

    let mut bindings = Vec::with_capacity(ids.len());
    for id in ids {
        match load_custom_binding(cache, &id) {
            Ok(binding) => bindings.push(Binding::Custom(binding)),
            Err(error) => warn!("skipping custom keybinding {id}: {error}"),
        }
    }

    SourceBatch {
        categories: vec![custom_category()],
        bindings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn next_id_fills_the_lowest_gap() {
        assert_eq!(next_custom_id(&[]), "custom0");
        assert_eq!(next_custom_id(&list(&["custom0", "custom1"])), "custom2");
        assert_eq!(next_custom_id(&list(&["custom0", "custom2", "__dummy__"])), "custom1");
        assert_eq!(next_custom_id(&list(&["custom1"])), "custom0");
    }

    #[test]
    fn sentinel_toggles_in_pairs() {
        let mut ids = list(&["custom0"]);
        toggle_sentinel(&mut ids);
        assert_eq!(ids, list(&["custom0", "__dummy__"]));
        toggle_sentinel(&mut ids);
        assert_eq!(ids, list(&["custom0"]));
    }
}
