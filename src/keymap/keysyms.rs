//! X keysym names: the Latin-1 range, function and keypad keys, the
//! misc/XF86 keys desktop shortcuts use, and any character in the
//! `U+XXXX` form.

const F1: u32 = 0xffbe;
const KP_0: u32 = 0xffb0;
const KP_F1: u32 = 0xff91;
const XF86_LAUNCH0: u32 = 0x1008_ff40;
const UNICODE_BASE: u32 = 0x0100_0000;

// Window manager virtual key for the key above Tab.
const ABOVE_TAB: u32 = 0x2f72_59c9;

/// 0xa0..=0xff in code order; lowercase letters above 0xdf are derived.
const LATIN1: [&str; 64] = [
    "nobreakspace", "exclamdown", "cent", "sterling", "currency", "yen", "brokenbar", "section",
    "diaeresis", "copyright", "ordfeminine", "guillemotleft", "notsign", "hyphen", "registered",
    "macron", "degree", "plusminus", "twosuperior", "threesuperior", "acute", "mu", "paragraph",
    "periodcentered", "cedilla", "onesuperior", "masculine", "guillemotright", "onequarter",
    "onehalf", "threequarters", "questiondown", "Agrave", "Aacute", "Acircumflex", "Atilde",
    "Adiaeresis", "Aring", "AE", "Ccedilla", "Egrave", "Eacute", "Ecircumflex", "Ediaeresis",
    "Igrave", "Iacute", "Icircumflex", "Idiaeresis", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocircumflex", "Otilde", "Odiaeresis", "multiply", "Oslash", "Ugrave", "Uacute",
    "Ucircumflex", "Udiaeresis", "Yacute", "THORN", "ssharp",
];

fn latin1_name(sym: u32) -> Option<String> {
    match sym {
        0xa0..=0xdf => Some(LATIN1[(sym - 0xa0) as usize].to_string()),
        0xf7 => Some("division".to_string()),
        0xff => Some("ydiaeresis".to_string()),
        0xe0..=0xfe => Some(LATIN1[(sym - 0xc0) as usize].to_ascii_lowercase()),
        _ => None,
    }
}

fn latin1_from_name(name: &str) -> Option<u32> {
    if let Some(position) = LATIN1.iter().position(|known| *known == name) {
        let sym = 0xa0 + position as u32;
        // Uppercase letters fold to lowercase, as ASCII letters do.
        return Some(if (0xc0..=0xde).contains(&sym) && sym != 0xd7 {
            sym + 0x20
        } else {
            sym
        });
    }
    match name {
        "division" => Some(0xf7),
        "ydiaeresis" => Some(0xff),
        "Ooblique" | "ooblique" => Some(0xf8),
        _ => (0xe0..=0xfe)
            .filter(|sym| *sym != 0xf7)
            .find(|sym| latin1_name(*sym).as_deref() == Some(name)),
    }
}

/// `U+20AC` or `U20AC`. Code points with a Latin-1 keysym map onto it.
fn unicode_from_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("U+").or_else(|| name.strip_prefix('U'))?;
    if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let ch = char::from_u32(u32::from_str_radix(digits, 16).ok()?)?;
    let mut lower = ch.to_lowercase();
    let ch = match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => ch,
    };
    let code = ch as u32;
    Some(match code {
        0x20..=0x7e | 0xa0..=0xff => code,
        0..=0x1f | 0x7f..=0x9f => return None,
        _ => UNICODE_BASE + code,
    })
}

const NAMED: &[(&str, u32)] = &[
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("quotedbl", 0x0022),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("asciicircum", 0x005e),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("braceleft", 0x007b),
    ("bar", 0x007c),
    ("braceright", 0x007d),
    ("asciitilde", 0x007e),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Linefeed", 0xff0a),
    ("Clear", 0xff0b),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Sys_Req", 0xff15),
    ("Escape", 0xff1b),
    ("Multi_key", 0xff20),
    ("ISO_Level3_Shift", 0xfe03),
    ("ISO_Left_Tab", 0xfe20),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Page_Up", 0xff55),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Select", 0xff60),
    ("Print", 0xff61),
    ("Execute", 0xff62),
    ("Insert", 0xff63),
    ("Undo", 0xff65),
    ("Redo", 0xff66),
    ("Menu", 0xff67),
    ("Find", 0xff68),
    ("Cancel", 0xff69),
    ("Help", 0xff6a),
    ("Break", 0xff6b),
    ("Mode_switch", 0xff7e),
    ("Num_Lock", 0xff7f),
    ("KP_Space", 0xff80),
    ("KP_Tab", 0xff89),
    ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95),
    ("KP_Left", 0xff96),
    ("KP_Up", 0xff97),
    ("KP_Right", 0xff98),
    ("KP_Down", 0xff99),
    ("KP_Page_Up", 0xff9a),
    ("KP_Page_Down", 0xff9b),
    ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d),
    ("KP_Insert", 0xff9e),
    ("KP_Delete", 0xff9f),
    ("KP_Multiply", 0xffaa),
    ("KP_Add", 0xffab),
    ("KP_Separator", 0xffac),
    ("KP_Subtract", 0xffad),
    ("KP_Decimal", 0xffae),
    ("KP_Divide", 0xffaf),
    ("KP_Equal", 0xffbd),
    ("Shift_L", 0xffe1),
    ("Shift_R", 0xffe2),
    ("Control_L", 0xffe3),
    ("Control_R", 0xffe4),
    ("Caps_Lock", 0xffe5),
    ("Meta_L", 0xffe7),
    ("Meta_R", 0xffe8),
    ("Alt_L", 0xffe9),
    ("Alt_R", 0xffea),
    ("Super_L", 0xffeb),
    ("Super_R", 0xffec),
    ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee),
    ("Delete", 0xffff),
    ("Above_Tab", ABOVE_TAB),
    ("XF86MonBrightnessUp", 0x1008_ff02),
    ("XF86MonBrightnessDown", 0x1008_ff03),
    ("XF86KbdLightOnOff", 0x1008_ff04),
    ("XF86KbdBrightnessUp", 0x1008_ff05),
    ("XF86KbdBrightnessDown", 0x1008_ff06),
    ("XF86Standby", 0x1008_ff10),
    ("XF86AudioLowerVolume", 0x1008_ff11),
    ("XF86AudioMute", 0x1008_ff12),
    ("XF86AudioRaiseVolume", 0x1008_ff13),
    ("XF86AudioPlay", 0x1008_ff14),
    ("XF86AudioStop", 0x1008_ff15),
    ("XF86AudioPrev", 0x1008_ff16),
    ("XF86AudioNext", 0x1008_ff17),
    ("XF86HomePage", 0x1008_ff18),
    ("XF86Mail", 0x1008_ff19),
    ("XF86Search", 0x1008_ff1b),
    ("XF86AudioRecord", 0x1008_ff1c),
    ("XF86Calculator", 0x1008_ff1d),
    ("XF86Calendar", 0x1008_ff20),
    ("XF86PowerDown", 0x1008_ff21),
    ("XF86Back", 0x1008_ff26),
    ("XF86Forward", 0x1008_ff27),
    ("XF86Stop", 0x1008_ff28),
    ("XF86Refresh", 0x1008_ff29),
    ("XF86PowerOff", 0x1008_ff2a),
    ("XF86Eject", 0x1008_ff2c),
    ("XF86ScreenSaver", 0x1008_ff2d),
    ("XF86WWW", 0x1008_ff2e),
    ("XF86Sleep", 0x1008_ff2f),
    ("XF86Favorites", 0x1008_ff30),
    ("XF86AudioPause", 0x1008_ff31),
    ("XF86AudioMedia", 0x1008_ff32),
    ("XF86MyComputer", 0x1008_ff33),
    ("XF86AudioRewind", 0x1008_ff3e),
    ("XF86Close", 0x1008_ff56),
    ("XF86Copy", 0x1008_ff57),
    ("XF86Cut", 0x1008_ff58),
    ("XF86Display", 0x1008_ff59),
    ("XF86Documents", 0x1008_ff5b),
    ("XF86Explorer", 0x1008_ff5d),
    ("XF86LogOff", 0x1008_ff61),
    ("XF86Open", 0x1008_ff6b),
    ("XF86Paste", 0x1008_ff6d),
    ("XF86Reload", 0x1008_ff73),
    ("XF86RotateWindows", 0x1008_ff74),
    ("XF86Save", 0x1008_ff77),
    ("XF86Terminal", 0x1008_ff80),
    ("XF86Tools", 0x1008_ff81),
    ("XF86Video", 0x1008_ff87),
    ("XF86Messenger", 0x1008_ff8e),
    ("XF86WebCam", 0x1008_ff8f),
    ("XF86Pictures", 0x1008_ff91),
    ("XF86Music", 0x1008_ff92),
    ("XF86Battery", 0x1008_ff93),
    ("XF86Bluetooth", 0x1008_ff94),
    ("XF86WLAN", 0x1008_ff95),
    ("XF86AudioForward", 0x1008_ff97),
    ("XF86AudioRepeat", 0x1008_ff98),
    ("XF86AudioRandomPlay", 0x1008_ff99),
    ("XF86Suspend", 0x1008_ffa7),
    ("XF86Hibernate", 0x1008_ffa8),
    ("XF86TouchpadToggle", 0x1008_ffa9),
    ("XF86TouchpadOn", 0x1008_ffb0),
    ("XF86TouchpadOff", 0x1008_ffb1),
    ("XF86AudioMicMute", 0x1008_ffb2),
    ("XF86RFKill", 0x1008_ffb5),
];

// Accepted on input, never produced.
const ALIASES: &[(&str, u32)] = &[
    ("Prior", 0xff55),
    ("Next", 0xff56),
    ("KP_Prior", 0xff9a),
    ("KP_Next", 0xff9b),
];

/// Resolves a key name to its keysym. Letters fold to lowercase.
pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphanumeric() {
            return Some(ch.to_ascii_lowercase() as u32);
        }
    }

    if let Some(number) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        if (1..=35).contains(&number) {
            return Some(F1 + number - 1);
        }
    }
    if let Some(digit) = name.strip_prefix("KP_").and_then(|n| n.parse::<u32>().ok()) {
        if digit <= 9 {
            return Some(KP_0 + digit);
        }
    }
    if let Some(number) = name.strip_prefix("KP_F").and_then(|n| n.parse::<u32>().ok()) {
        if (1..=4).contains(&number) {
            return Some(KP_F1 + number - 1);
        }
    }
    if let Some(digit) = name
        .strip_prefix("XF86Launch")
        .filter(|rest| rest.len() == 1)
        .and_then(|rest| u32::from_str_radix(rest, 16).ok())
    {
        return Some(XF86_LAUNCH0 + digit);
    }
    if let Some(sym) = latin1_from_name(name) {
        return Some(sym);
    }
    if let Some(sym) = unicode_from_name(name) {
        return Some(sym);
    }

    NAMED
        .iter()
        .chain(ALIASES)
        .find(|(known, _)| *known == name)
        .or_else(|| {
            NAMED
                .iter()
                .chain(ALIASES)
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
        })
        .map(|&(_, sym)| sym)
}

pub fn keysym_name(sym: u32) -> Option<String> {
    if let Some(ch) = char::from_u32(sym).filter(|ch| ch.is_ascii_alphanumeric()) {
        return Some(ch.to_string());
    }
    if (F1..F1 + 35).contains(&sym) {
        return Some(format!("F{}", sym - F1 + 1));
    }
    if (KP_0..=KP_0 + 9).contains(&sym) {
        return Some(format!("KP_{}", sym - KP_0));
    }
    if (KP_F1..KP_F1 + 4).contains(&sym) {
        return Some(format!("KP_F{}", sym - KP_F1 + 1));
    }
    if (XF86_LAUNCH0..XF86_LAUNCH0 + 16).contains(&sym) {
        return Some(format!("XF86Launch{:X}", sym - XF86_LAUNCH0));
    }
    if let Some(name) = latin1_name(sym) {
        return Some(name);
    }
    if let Some(name) = NAMED
        .iter()
        .find(|&&(_, known)| known == sym)
        .map(|(name, _)| name.to_string())
    {
        return Some(name);
    }
    sym.checked_sub(UNICODE_BASE)
        .filter(|code| *code > 0xff && char::from_u32(*code).is_some())
        .map(|code| format!("U{code:04X}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_fold_to_lowercase() {
        assert_eq!(keysym_from_name("D"), Some(0x64));
        assert_eq!(keysym_from_name("d"), Some(0x64));
        assert_eq!(keysym_name(0x64).as_deref(), Some("d"));
    }

    #[test]
    fn function_and_keypad_keys() {
        assert_eq!(keysym_from_name("F12"), Some(0xffc9));
        assert_eq!(keysym_name(0xffc9).as_deref(), Some("F12"));
        assert_eq!(keysym_from_name("KP_7"), Some(0xffb7));
        assert_eq!(keysym_from_name("F36"), None);
    }

    #[test]
    fn aliases_resolve_to_primary_name() {
        let sym = keysym_from_name("Prior").unwrap();
        assert_eq!(keysym_name(sym).as_deref(), Some("Page_Up"));
        assert_eq!(keysym_from_name("return"), Some(0xff0d));
        assert_eq!(keysym_from_name("NoSuchKey"), None);
    }

    #[test]
    fn latin1_names_fold_to_lowercase() {
        assert_eq!(keysym_from_name("eacute"), Some(0xe9));
        assert_eq!(keysym_from_name("Eacute"), Some(0xe9));
        assert_eq!(keysym_name(0xe9).as_deref(), Some("eacute"));
        assert_eq!(keysym_from_name("ssharp"), Some(0xdf));
        assert_eq!(keysym_from_name("multiply"), Some(0xd7));
        assert_eq!(keysym_from_name("division"), Some(0xf7));
        assert_eq!(keysym_name(0xe6).as_deref(), Some("ae"));
        assert_eq!(keysym_name(0xa7).as_deref(), Some("section"));
        assert_eq!(keysym_from_name("ooblique"), Some(0xf8));
    }

    #[test]
    fn unicode_names_cover_every_character() {
        assert_eq!(keysym_from_name("U+20AC"), Some(0x0100_20ac));
        assert_eq!(keysym_from_name("U20AC"), Some(0x0100_20ac));
        assert_eq!(keysym_name(0x0100_20ac).as_deref(), Some("U20AC"));
        assert_eq!(keysym_from_name("U+0416"), keysym_from_name("U+0436"));
        assert_eq!(keysym_from_name("U+00E9"), Some(0xe9));
        assert_eq!(keysym_from_name("U+0007"), None);
        assert_eq!(keysym_from_name("Undo"), Some(0xff65));
    }

    #[test]
    fn launch_keys_and_virtual_keys() {
        assert_eq!(keysym_from_name("XF86Launch1"), Some(0x1008_ff41));
        assert_eq!(keysym_name(0x1008_ff4c).as_deref(), Some("XF86LaunchC"));
        assert_eq!(keysym_from_name("Above_Tab"), Some(ABOVE_TAB));
        assert_eq!(keysym_name(ABOVE_TAB).as_deref(), Some("Above_Tab"));
        assert_eq!(keysym_from_name("KP_F2"), Some(0xff92));
    }
}
