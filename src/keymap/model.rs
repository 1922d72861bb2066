use super::category::{CUSTOM_CATEGORY, SPICES_CATEGORY};
use crate::settings::{SchemaDefaults, SettingValue};

pub const WM_SCHEMA: &str = "org.cinnamon.desktop.keybindings.wm";
pub const MEDIA_KEYS_SCHEMA: &str = "org.cinnamon.desktop.keybindings.media-keys";
pub const KEYBINDINGS_SCHEMA: &str = "org.cinnamon.desktop.keybindings";
pub const CUSTOM_KEYBINDING_SCHEMA: &str = "org.cinnamon.desktop.keybindings.custom-keybinding";
pub const CUSTOM_KEYBINDINGS_PATH: &str = "/org/cinnamon/desktop/keybindings/custom-keybindings/";
pub const CUSTOM_LIST_KEY: &str = "custom-list";
pub const SHELL_SCHEMA: &str = "org.cinnamon";

/// Marker toggled in the custom list so list watchers always see a change.
pub const CUSTOM_LIST_SENTINEL: &str = "__dummy__";

#[derive(Clone, Copy, Debug)]
pub struct StaticCategoryDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub parent: Option<&'static str>,
    pub icon: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct StaticBindingDefinition {
    pub label: &'static str,
    pub schema: &'static str,
    pub key: &'static str,
    pub category: &'static str,
    pub default: &'static [&'static str],
}

const fn category(
    id: &'static str,
    label: &'static str,
    parent: Option<&'static str>,
    icon: &'static str,
) -> StaticCategoryDefinition {
    StaticCategoryDefinition {
        id,
        label,
        parent,
        icon,
    }
}

const fn wm(
    label: &'static str,
    key: &'static str,
    category: &'static str,
    default: &'static [&'static str],
) -> StaticBindingDefinition {
    StaticBindingDefinition {
        label,
        schema: WM_SCHEMA,
        key,
        category,
        default,
    }
}

const fn media(
    label: &'static str,
    key: &'static str,
    category: &'static str,
    default: &'static [&'static str],
) -> StaticBindingDefinition {
    StaticBindingDefinition {
        label,
        schema: MEDIA_KEYS_SCHEMA,
        key,
        category,
        default,
    }
}

const fn shell(
    label: &'static str,
    key: &'static str,
    category: &'static str,
    default: &'static [&'static str],
) -> StaticBindingDefinition {
    StaticBindingDefinition {
        label,
        schema: KEYBINDINGS_SCHEMA,
        key,
        category,
        default,
    }
}

pub const STATIC_CATEGORIES: &[StaticCategoryDefinition] = &[
    category("general", "General", None, "preferences-desktop-keyboard-shortcuts"),
    category("trouble", "Troubleshooting", Some("general"), "dialog-warning"),
    category("windows", "Windows", None, "preferences-system-windows"),
    category("win-position", "Positioning", Some("windows"), "view-restore"),
    category("win-tiling", "Tiling and Snapping", Some("windows"), "view-grid"),
    category("win-workspaces", "Inter-workspace", Some("windows"), "object-flip-horizontal"),
    category("win-monitors", "Inter-monitor", Some("windows"), "video-display"),
    category("workspaces", "Workspaces", None, "video-display"),
    category("ws-navigation", "Direct Navigation", Some("workspaces"), "go-jump"),
    category("system", "System", None, "preferences-system"),
    category("hardware", "Hardware", Some("system"), "computer"),
    category("screenshot", "Screenshots and Recording", Some("system"), "applets-screenshooter"),
    category("launchers", "Launchers", None, "applications-utilities"),
    category("media", "Sound and Media", None, "applications-multimedia"),
    category("media-quiet", "Quiet Keys", Some("media"), "audio-volume-muted"),
    category("accessibility", "Universal Access", None, "preferences-desktop-accessibility"),
    category(CUSTOM_CATEGORY, "Custom Shortcuts", None, "applications-other"),
    category(SPICES_CATEGORY, "Spices", None, "cinnamon"),
];

pub const STATIC_BINDINGS: &[StaticBindingDefinition] = &[
    // General
    wm("Show the window selection screen", "switch-to-workspace-down", "general", &["<Primary><Alt>Down"]),
    wm("Show the workspace selection screen", "switch-to-workspace-up", "general", &["<Primary><Alt>Up"]),
    wm("Show desktop", "show-desktop", "general", &["<Super>d"]),
    shell("Show Desklets", "show-desklets", "general", &["<Super>s"]),
    wm("Cycle through open windows", "switch-windows", "general", &["<Alt>Tab"]),
    wm("Cycle backwards through open windows", "switch-windows-backward", "general", &["<Shift><Alt>Tab"]),
    wm("Cycle through windows from all workspaces", "switch-group", "general", &[]),
    wm("Run dialog", "panel-run-dialog", "general", &["<Alt>F2"]),
    // Troubleshooting
    shell("Toggle Looking Glass", "looking-glass-keybinding", "trouble", &["<Super>l"]),
    shell("Restart Cinnamon", "restart-cinnamon", "trouble", &["<Primary><Alt>Escape"]),
    // Windows
    wm("Maximize window", "maximize", "windows", &[]),
    wm("Unmaximize window", "unmaximize", "windows", &["<Alt>F5"]),
    wm("Minimize window", "minimize", "windows", &["<Alt>F9"]),
    wm("Close window", "close", "windows", &["<Alt>F4"]),
    wm("Show window menu", "activate-window-menu", "windows", &["<Alt>space"]),
    wm("Toggle maximization state", "toggle-maximized", "windows", &["<Alt>F10"]),
    wm("Toggle fullscreen state", "toggle-fullscreen", "windows", &[]),
    wm("Toggle shaded state", "toggle-shaded", "windows", &[]),
    wm("Toggle always on top", "toggle-above", "windows", &[]),
    wm("Toggle showing window on all workspaces", "toggle-on-all-workspaces", "windows", &[]),
    // Positioning
    wm("Resize window", "begin-resize", "win-position", &["<Alt>F8"]),
    wm("Move window", "begin-move", "win-position", &["<Alt>F7"]),
    wm("Center window in screen", "move-to-center", "win-position", &[]),
    wm("Move window to upper-right", "move-to-corner-ne", "win-position", &[]),
    wm("Move window to upper-left", "move-to-corner-nw", "win-position", &[]),
    wm("Move window to lower-right", "move-to-corner-se", "win-position", &[]),
    wm("Move window to lower-left", "move-to-corner-sw", "win-position", &[]),
    // Tiling
    wm("Push tile left", "push-tile-left", "win-tiling", &["<Super>Left"]),
    wm("Push tile right", "push-tile-right", "win-tiling", &["<Super>Right"]),
    wm("Push tile up", "push-tile-up", "win-tiling", &["<Super>Up"]),
    wm("Push tile down", "push-tile-down", "win-tiling", &["<Super>Down"]),
    wm("Push snap left", "push-snap-left", "win-tiling", &[]),
    wm("Push snap right", "push-snap-right", "win-tiling", &[]),
    // Inter-workspace
    wm("Move window to left workspace", "move-to-workspace-left", "win-workspaces", &["<Shift><Primary><Alt>Left"]),
    wm("Move window to right workspace", "move-to-workspace-right", "win-workspaces", &["<Shift><Primary><Alt>Right"]),
    // Inter-monitor
    wm("Move window to left monitor", "move-to-monitor-left", "win-monitors", &["<Shift><Super>Left"]),
    wm("Move window to right monitor", "move-to-monitor-right", "win-monitors", &["<Shift><Super>Right"]),
    // Workspaces
    wm("Switch to left workspace", "switch-to-workspace-left", "workspaces", &["<Primary><Alt>Left"]),
    wm("Switch to right workspace", "switch-to-workspace-right", "workspaces", &["<Primary><Alt>Right"]),
    wm("Switch to workspace 1", "switch-to-workspace-1", "ws-navigation", &[]),
    wm("Switch to workspace 2", "switch-to-workspace-2", "ws-navigation", &[]),
    wm("Switch to workspace 3", "switch-to-workspace-3", "ws-navigation", &[]),
    wm("Switch to workspace 4", "switch-to-workspace-4", "ws-navigation", &[]),
    // System
    media("Log out", "logout", "system", &["<Primary><Alt>Delete"]),
    media("Shut down", "shutdown", "system", &[]),
    media("Lock screen", "screensaver", "system", &["<Primary><Alt>l", "XF86ScreenSaver"]),
    media("Suspend", "suspend", "system", &["XF86Sleep"]),
    media("Hibernate", "hibernate", "system", &["XF86Suspend", "XF86Hibernate"]),
    // Hardware
    media("Re-detect display devices", "video-outputs", "hardware", &["XF86Display"]),
    media("Rotate display", "rotate-video-lock", "hardware", &[]),
    media("Increase screen brightness", "screen-brightness-up", "hardware", &["XF86MonBrightnessUp"]),
    media("Decrease screen brightness", "screen-brightness-down", "hardware", &["XF86MonBrightnessDown"]),
    media("Toggle touchpad state", "touchpad-toggle", "hardware", &["XF86TouchpadToggle"]),
    // Screenshots
    media("Take a screenshot of an area", "area-screenshot", "screenshot", &["<Shift>Print"]),
    media("Take a screenshot", "screenshot", "screenshot", &["Print"]),
    media("Take a screenshot of a window", "window-screenshot", "screenshot", &["<Alt>Print"]),
    media("Toggle recording desktop", "toggle-recording", "screenshot", &["<Shift><Primary><Alt>r"]),
    // Launchers
    media("Launch terminal", "terminal", "launchers", &["<Primary><Alt>t"]),
    media("Launch calculator", "calculator", "launchers", &["XF86Calculator"]),
    media("Launch email client", "email", "launchers", &["XF86Mail"]),
    media("Launch web browser", "www", "launchers", &["XF86WWW"]),
    media("Home folder", "home", "launchers", &["<Super>e", "XF86Explorer"]),
    media("Search", "search", "launchers", &["XF86Search"]),
    // Sound and Media
    media("Volume mute", "volume-mute", "media", &["XF86AudioMute"]),
    media("Volume down", "volume-down", "media", &["XF86AudioLowerVolume"]),
    media("Volume up", "volume-up", "media", &["XF86AudioRaiseVolume"]),
    media("Microphone mute", "mic-mute", "media", &["XF86AudioMicMute"]),
    media("Launch media player", "media", "media", &["XF86AudioMedia"]),
    media("Play", "play", "media", &["XF86AudioPlay"]),
    media("Pause playback", "pause", "media", &["XF86AudioPause"]),
    media("Stop playback", "stop", "media", &["XF86AudioStop"]),
    media("Previous track", "previous", "media", &["XF86AudioPrev"]),
    media("Next track", "next", "media", &["XF86AudioNext"]),
    media("Eject", "eject", "media", &["XF86Eject"]),
    // Quiet keys
    media("Volume mute (Quiet)", "volume-mute-quiet", "media-quiet", &["<Alt>XF86AudioMute"]),
    media("Volume down (Quiet)", "volume-down-quiet", "media-quiet", &["<Alt>XF86AudioLowerVolume"]),
    media("Volume up (Quiet)", "volume-up-quiet", "media-quiet", &["<Alt>XF86AudioRaiseVolume"]),
    // Universal Access
    media("Zoom in", "magnifier-zoom-in", "accessibility", &["<Alt><Super>equal"]),
    media("Zoom out", "magnifier-zoom-out", "accessibility", &["<Alt><Super>minus"]),
    media("Turn screen reader on or off", "screenreader", "accessibility", &["<Alt><Super>s"]),
    media("Turn on-screen keyboard on or off", "on-screen-keyboard", "accessibility", &[]),
    media("Increase text size", "increase-text-size", "accessibility", &[]),
    media("Decrease text size", "decrease-text-size", "accessibility", &[]),
    media("High contrast on or off", "toggle-contrast", "accessibility", &[]),
];

pub fn custom_keybinding_path(path_id: &str) -> String {
    format!("{CUSTOM_KEYBINDINGS_PATH}{path_id}/")
}

/// Every key this crate reads or writes, with its declared default.
pub fn desktop_schema_defaults() -> SchemaDefaults {
    let mut defaults = SchemaDefaults::new();
    for def in STATIC_BINDINGS {
        defaults.declare(
            def.schema,
            def.key,
            SettingValue::strv(def.default.iter().copied()),
        );
    }
    defaults
        .declare(KEYBINDINGS_SCHEMA, CUSTOM_LIST_KEY, SettingValue::strv(Vec::<String>::new()))
        .declare(CUSTOM_KEYBINDING_SCHEMA, "name", SettingValue::String(String::new()))
        .declare(CUSTOM_KEYBINDING_SCHEMA, "command", SettingValue::String(String::new()))
        .declare(CUSTOM_KEYBINDING_SCHEMA, "binding", SettingValue::strv(Vec::<String>::new()));
    for kind in super::loaders::SpiceKind::ALL {
        defaults.declare(
            SHELL_SCHEMA,
            kind.enabled_key(),
            SettingValue::strv(Vec::<String>::new()),
        );
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn static_bindings_reference_known_categories() {
        let ids: HashSet<&str> = STATIC_CATEGORIES.iter().map(|c| c.id).collect();
        for def in STATIC_BINDINGS {
            assert!(ids.contains(def.category), "{} has unknown category", def.key);
        }
        for cat in STATIC_CATEGORIES {
            if let Some(parent) = cat.parent {
                let parent_def = STATIC_CATEGORIES.iter().find(|c| c.id == parent).unwrap();
                assert!(parent_def.parent.is_none(), "{} nests too deep", cat.id);
            }
        }
    }

    #[test]
    fn store_keys_are_unique_per_schema() {
        let mut seen = HashSet::new();
        for def in STATIC_BINDINGS {
            assert!(seen.insert((def.schema, def.key)), "duplicate {}", def.key);
        }
    }

    #[test]
    fn defaults_do_not_collide() {
        let mut seen = HashSet::new();
        for def in STATIC_BINDINGS {
            for accel in def.default {
                let canonical = crate::keymap::accelerator::normalize(accel);
                assert!(!canonical.is_empty(), "{accel} does not parse");
                assert!(seen.insert(canonical), "{accel} is a default twice");
            }
        }
    }

    #[test]
    fn defaults_fit_three_slots() {
        for def in STATIC_BINDINGS {
            assert!(def.default.len() <= 3);
        }
    }
}
