pub mod config;
pub mod errors;
pub mod keymap;
pub mod logging;
pub mod settings;
pub mod shell_bus;
pub mod watcher;

pub use config::{SpicePaths, TableConfig};
pub use keymap::{
    AlwaysReassign, Binding, BindingKey, Category, ConflictResolver, EventKind, KeyBinding,
    KeybindingError, KeybindingResult, KeybindingTable, NeverReassign, TableEvent,
};
pub use settings::{SettingsStore, StoreError};
pub use shell_bus::{NoShell, ShellBus};
