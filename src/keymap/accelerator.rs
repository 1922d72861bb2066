use super::keysyms::{keysym_from_name, keysym_name};
use bitflags::bitflags;
use std::fmt;
use std::hash::{Hash, Hasher};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
        const RELEASE = 1 << 30;
    }
}

// Canonical output order.
const MODIFIER_NAMES: &[(Modifiers, &str)] = &[
    (Modifiers::RELEASE, "Release"),
    (Modifiers::SHIFT, "Shift"),
    (Modifiers::CONTROL, "Primary"),
    (Modifiers::ALT, "Alt"),
    (Modifiers::MOD2, "Mod2"),
    (Modifiers::MOD3, "Mod3"),
    (Modifiers::MOD4, "Mod4"),
    (Modifiers::MOD5, "Mod5"),
    (Modifiers::SUPER, "Super"),
    (Modifiers::HYPER, "Hyper"),
    (Modifiers::META, "Meta"),
];

fn modifier_from_name(name: &str) -> Option<Modifiers> {
    let lowered = name.to_ascii_lowercase();
    let modifier = match lowered.as_str() {
        "shift" | "shft" => Modifiers::SHIFT,
        // Control is the legacy spelling of Primary; both name one key.
        "primary" | "control" | "ctrl" | "ctl" => Modifiers::CONTROL,
        "alt" | "mod1" => Modifiers::ALT,
        "mod2" => Modifiers::MOD2,
        "mod3" => Modifiers::MOD3,
        "mod4" => Modifiers::MOD4,
        "mod5" => Modifiers::MOD5,
        "super" => Modifiers::SUPER,
        "hyper" => Modifiers::HYPER,
        "meta" => Modifiers::META,
        "release" => Modifiers::RELEASE,
        _ => return None,
    };
    Some(modifier)
}

fn parse_keycode(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))?;
    u32::from_str_radix(digits, 16).ok().filter(|code| *code > 0)
}

/// One parsed key combination.
///
/// The null accelerator (no key, no keycode) stands for an unset slot and is
/// what every empty or unparsable string parses to.
#[derive(Debug, Clone, Default)]
pub struct Accelerator {
    key_symbol: u32,
    keycode: u32,
    modifiers: Modifiers,
    canonical: String,
}

impl Accelerator {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_default()
    }

    fn try_parse(raw: &str) -> Option<Self> {
        let mut rest = raw.trim();
        let mut modifiers = Modifiers::empty();
        while let Some(tail) = rest.strip_prefix('<') {
            let end = tail.find('>')?;
            modifiers |= modifier_from_name(tail[..end].trim())?;
            rest = tail[end + 1..].trim_start();
        }

        let token = rest.trim();
        if token.is_empty() {
            return None;
        }
        let (key_symbol, keycode) = match parse_keycode(token) {
            Some(code) => (0, code),
            None => (keysym_from_name(token)?, 0),
        };
        Some(Self::from_parts(key_symbol, keycode, modifiers))
    }

    pub fn from_parts(key_symbol: u32, keycode: u32, modifiers: Modifiers) -> Self {
        if key_symbol == 0 && keycode == 0 {
            return Self::null();
        }
        let mut canonical = String::new();
        for (flag, name) in MODIFIER_NAMES {
            if modifiers.contains(*flag) {
                canonical.push('<');
                canonical.push_str(name);
                canonical.push('>');
            }
        }
        if key_symbol != 0 {
            match keysym_name(key_symbol) {
                Some(name) => canonical.push_str(&name),
                None => return Self::null(),
            }
        } else {
            canonical.push_str(&format!("0x{keycode:x}"));
        }
        Self {
            key_symbol,
            keycode,
            modifiers,
            canonical,
        }
    }

    pub fn is_null(&self) -> bool {
        self.key_symbol == 0 && self.keycode == 0
    }

    pub fn key_symbol(&self) -> u32 {
        self.key_symbol
    }

    pub fn keycode(&self) -> u32 {
        self.keycode
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Canonical string; empty for the null accelerator.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Human readable form, e.g. `Super+D`.
    pub fn label(&self) -> String {
        if self.is_null() {
            return String::new();
        }
        let mut parts: Vec<String> = Vec::with_capacity(4);
        for (flag, name) in MODIFIER_NAMES {
            if *flag == Modifiers::RELEASE || !self.modifiers.contains(*flag) {
                continue;
            }
            let label = if *flag == Modifiers::CONTROL {
                "Ctrl"
            } else {
                name
            };
            parts.push(label.to_string());
        }
        let key = self
            .canonical
            .rsplit('>')
            .next()
            .unwrap_or_default()
            .to_string();
        let key = if key.len() == 1 {
            key.to_ascii_uppercase()
        } else {
            key.replace('_', " ")
        };
        parts.push(key);
        parts.join("+")
    }
}

impl PartialEq for Accelerator {
    fn eq(&self, other: &Self) -> bool {
        self.key_symbol == other.key_symbol
            && self.keycode == other.keycode
            && self.modifiers == other.modifiers
    }
}

impl Eq for Accelerator {}

impl Hash for Accelerator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_symbol.hash(state);
        self.keycode.hash(state);
        self.modifiers.hash(state);
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

/// Canonical string for `raw`; empty when it does not parse.
pub fn normalize(raw: &str) -> String {
    Accelerator::parse(raw).canonical
}

/// Whether two accelerator strings name the same non-null combination.
pub fn same_accelerator(left: &str, right: &str) -> bool {
    let left = Accelerator::parse(left);
    !left.is_null() && left == Accelerator::parse(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_garbage_parse_to_null() {
        for raw in ["", "   ", "<Super>", "<Bogus>d", "<Super", "NoSuchKey", "0x0"] {
            let accel = Accelerator::parse(raw);
            assert!(accel.is_null(), "{raw:?} should be null");
            assert_eq!(accel.canonical(), "");
        }
    }

    #[test]
    fn legacy_control_alias_equals_primary() {
        let legacy = Accelerator::parse("<Control><Alt>t");
        let current = Accelerator::parse("<Primary><Alt>t");
        assert_eq!(legacy, current);
        assert_eq!(legacy.canonical(), "<Primary><Alt>t");
        assert!(same_accelerator("<Ctrl><Alt>T", "<Alt><Primary>t"));
    }

    #[test]
    fn canonical_orders_modifiers() {
        assert_eq!(
            normalize("<Super><Shift><Control>Page_Down"),
            "<Shift><Primary><Super>Page_Down"
        );
        assert_eq!(normalize("<Mod1>F4"), "<Alt>F4");
        assert_eq!(normalize("<Alt>Prior"), "<Alt>Page_Up");
    }

    #[test]
    fn canonical_form_round_trips() {
        for raw in [
            "<Super>d",
            "<Control><Alt>Delete",
            "<Primary><Shift>Escape",
            "XF86AudioMute",
            "<Shift>Print",
            "<Super>KP_5",
            "<Alt>0x26",
            "<Release><Super>Super_L",
            "<Super>eacute",
            "<Super>Above_Tab",
            "<Primary>XF86Launch1",
            "<Alt>U+20AC",
            "<Shift>ISO_Left_Tab",
        ] {
            let accel = Accelerator::parse(raw);
            assert!(!accel.is_null(), "{raw:?} should parse");
            let again = Accelerator::parse(accel.canonical());
            assert_eq!(accel, again);
            assert_eq!(again.canonical(), accel.canonical());
            assert_eq!(accel.canonical(), normalize(raw));
        }
    }

    #[test]
    fn names_outside_ascii_resolve() {
        assert_eq!(normalize("<Super>Eacute"), "<Super>eacute");
        assert_eq!(normalize("<Alt>U+20AC"), "<Alt>U20AC");
        assert!(same_accelerator("<Super>U+00E9", "<Super>eacute"));
        assert_eq!(normalize("XF86LaunchA"), "XF86LaunchA");
    }

    #[test]
    fn hardware_keycodes_keep_their_code() {
        let accel = Accelerator::parse("<Super>0x26");
        assert_eq!(accel.keycode(), 0x26);
        assert_eq!(accel.key_symbol(), 0);
        assert_eq!(accel.canonical(), "<Super>0x26");
    }

    #[test]
    fn null_is_never_the_same_accelerator() {
        assert!(!same_accelerator("", ""));
        assert!(!same_accelerator("junk", "junk"));
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(Accelerator::parse("<Super>d").label(), "Super+D");
        assert_eq!(
            Accelerator::parse("<Control><Alt>Page_Up").label(),
            "Ctrl+Alt+Page Up"
        );
        assert_eq!(Accelerator::null().label(), "");
    }
}
