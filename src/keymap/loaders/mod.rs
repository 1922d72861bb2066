//! Loaders for the three binding sources. Each one is independently
//! re-runnable and absorbs per-item failures.

mod custom;
mod spice;
mod static_table;

use super::binding::Binding;
use super::category::Category;

pub use custom::{
    custom_category, custom_ids, custom_scope, load_custom, load_custom_binding, next_custom_id, toggle_sentinel,
};
pub use spice::{
    compare_instance_ids, enabled_spices, parse_config_file, scan_spices, Discovery,
    EnabledSpice, SpiceKeybinding, SpiceKind, SpiceScan,
};
pub use static_table::load_static;

/// Categories and bindings produced by one loader pass.
#[derive(Default)]
pub struct SourceBatch {
    pub categories: Vec<Category>,
    pub bindings: Vec<Binding>,
}
