//! Keyboard shortcut definitions from the desktop's static table, from
//! installed spices, and from the user's custom shortcuts, merged into one
//! table with collision tracking.

mod accelerator;
mod binding;
mod category;
mod collision;
mod error;
mod events;
mod keysyms;
pub mod loaders;
pub mod model;
mod resolver;
mod table;

pub use accelerator::{normalize, same_accelerator, Accelerator, Modifiers};
pub use binding::{
    fit_entries, unpack_spice_value, Binding, BindingKey, BindingKind, CustomBinding, KeyBinding,
    Resettable, SpiceBinding, StaticBinding, CUSTOM_ARITY, SPICE_ARITY, SPICE_VALUE_SEPARATOR,
    STATIC_ARITY,
};
pub use category::{Category, OriginHint, CUSTOM_CATEGORY, SPICES_CATEGORY};
pub use collision::CollisionIndex;
pub use error::{KeybindingError, KeybindingErrorCode, KeybindingResult};
pub use events::{Callback, EventKind, SubscriptionId, Subscribers, TableEvent};
pub use resolver::{AlwaysReassign, ConflictResolver, NeverReassign, Reassignment};
pub use table::KeybindingTable;
