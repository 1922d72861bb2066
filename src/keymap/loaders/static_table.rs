use super::SourceBatch;
use crate::keymap::binding::{Binding, StaticBinding};
use crate::keymap::category::{Category, CUSTOM_CATEGORY};
use crate::keymap::model::{STATIC_BINDINGS, STATIC_CATEGORIES};
use crate::settings::{SchemaCache, Scope};
use tracing::warn;

pub fn load_static(cache: &mut SchemaCache) -> SourceBatch {
    let categories = STATIC_CATEGORIES
        .iter()
        .filter(|def| def.id != CUSTOM_CATEGORY)
        .map(|def| Category::new(def.id, def.label, def.parent).with_icon(def.icon))
        .collect();

    let mut bindings = Vec::with_capacity(STATIC_BINDINGS.len());
    for def in STATIC_BINDINGS {
        let settings = cache.handle(&Scope::schema(def.schema));
        match StaticBinding::load(def.label, def.category, settings, def.key) {
            Ok(binding) => bindings.push(Binding::Static(binding)),
            Err(error) => warn!("skipping static binding {}/{}: {error}", def.schema, def.key),
        }
    }

    SourceBatch {
        categories,
        bindings,
    }
}
