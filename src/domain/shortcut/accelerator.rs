//! Accelerator grammar value object
//!
//! An accelerator is written as modifier tokens followed by exactly one main
//! key, joined by `+`. Modifiers are always emitted in the fixed order
//! `CommandOrControl`, `Alt`, `Shift`. Side-specific modifier codes such as
//! `ShiftRight` are accepted only as the main key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::AcceleratorError;

/// Generic modifier, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    CommandOrControl,
    Alt,
    Shift,
}

impl Modifier {
    /// Token used in accelerator strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommandOrControl => "CommandOrControl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
        }
    }

    /// Short label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Self::CommandOrControl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "commandorcontrol" | "cmdorctrl" | "commandorctrl" | "cmdorcontrol" | "ctrl"
            | "control" | "cmd" | "command" | "super" | "meta" => Some(Self::CommandOrControl),
            "alt" | "option" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }
}

/// Side-specific modifier codes usable as a standalone main key
const SIDED_MODIFIER_KEYS: &[(&str, &str)] = &[
    ("ShiftRight", "Right Shift"),
    ("ShiftLeft", "Left Shift"),
    ("ControlRight", "Right Ctrl"),
    ("ControlLeft", "Left Ctrl"),
    ("AltRight", "Right Option"),
    ("AltLeft", "Left Option"),
    ("MetaRight", "Right Cmd"),
    ("MetaLeft", "Left Cmd"),
];

/// Named main keys as `(canonical, aliases)`
const NAMED_KEYS: &[(&str, &[&str])] = &[
    ("Space", &["space", " "]),
    ("Enter", &["enter", "return"]),
    ("Tab", &["tab"]),
    ("Backspace", &["backspace"]),
    ("Delete", &["delete", "del"]),
    ("Insert", &["insert", "ins"]),
    ("Escape", &["escape", "esc"]),
    ("Home", &["home"]),
    ("End", &["end"]),
    ("PageUp", &["pageup"]),
    ("PageDown", &["pagedown"]),
    ("Up", &["up", "arrowup"]),
    ("Down", &["down", "arrowdown"]),
    ("Left", &["left", "arrowleft"]),
    ("Right", &["right", "arrowright"]),
    ("Minus", &["minus", "-"]),
    ("Equal", &["equal", "="]),
    ("BracketLeft", &["bracketleft", "["]),
    ("BracketRight", &["bracketright", "]"]),
    ("Backslash", &["backslash", "\\"]),
    ("Semicolon", &["semicolon", ";"]),
    ("Quote", &["quote", "'"]),
    ("Backquote", &["backquote", "`"]),
    ("Comma", &["comma", ","]),
    ("Period", &["period", "."]),
    ("Slash", &["slash", "/"]),
];

/// A parsed, normalised key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Accelerator {
    modifiers: Vec<Modifier>,
    key: String,
}

impl Accelerator {
    /// Build from parts, sorting and de-duplicating modifiers
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: &str) -> Result<Self, AcceleratorError> {
        let key = normalize_key(key).ok_or_else(|| AcceleratorError::UnknownKey(key.to_string()))?;
        let mut modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        modifiers.sort();
        modifiers.dedup();
        Ok(Self { modifiers, key })
    }

    /// Parse and normalise an accelerator string
    pub fn parse(input: &str) -> Result<Self, AcceleratorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AcceleratorError::Empty);
        }

        let mut modifiers = Vec::new();
        let mut key: Option<String> = None;

        for token in input.split('+') {
            let token = token.trim();
            if token.is_empty() {
                return Err(AcceleratorError::EmptyPart(input.to_string()));
            }
            if let Some(modifier) = Modifier::from_token(token) {
                modifiers.push(modifier);
                continue;
            }
            if key.is_some() {
                return Err(AcceleratorError::MultipleKeys(input.to_string()));
            }
            key = Some(token.to_string());
        }

        let key = key.ok_or_else(|| AcceleratorError::MissingKey(input.to_string()))?;
        Self::new(modifiers, &key)
    }

    /// Modifiers in emission order
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Main key token
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the main key is a side-specific modifier such as `ShiftRight`
    pub fn is_sided_modifier(&self) -> bool {
        is_sided_modifier_key(&self.key)
    }

    /// Physical key code of the main key, as reported by keyboard events
    pub fn key_code(&self) -> String {
        let key = self.key.as_str();
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{c}"),
            (Some(c), None) if c.is_ascii_digit() => format!("Digit{c}"),
            _ => match key {
                "Up" | "Down" | "Left" | "Right" => format!("Arrow{key}"),
                _ => key.to_string(),
            },
        }
    }

    /// Human-readable key names, modifiers first
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modifiers.iter().map(|m| m.label().to_string()).collect();
        names.push(key_label(&self.key));
        names
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for Accelerator {
    type Err = AcceleratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical spelling of an accelerator, or the trimmed input if it does not parse
pub fn canonicalize(input: &str) -> String {
    Accelerator::parse(input)
        .map(|a| a.to_string())
        .unwrap_or_else(|_| input.trim().to_string())
}

/// Whether `key` is one of the side-specific modifier codes
pub fn is_sided_modifier_key(key: &str) -> bool {
    SIDED_MODIFIER_KEYS.iter().any(|(code, _)| *code == key)
}

fn normalize_key(key: &str) -> Option<String> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.clone().next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c.to_ascii_uppercase().to_string());
        }
    }

    let key = key.trim();
    let lower = key.to_ascii_lowercase();

    if let Some(number) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&number).then(|| format!("F{number}"));
    }

    if let Some((code, _)) = SIDED_MODIFIER_KEYS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(key))
    {
        return Some((*code).to_string());
    }

    if let Some(digit) = lower.strip_prefix("digit").filter(|d| d.len() == 1) {
        return normalize_key(digit);
    }
    if let Some(letter) = lower.strip_prefix("key").filter(|l| l.len() == 1) {
        return normalize_key(letter);
    }

    NAMED_KEYS
        .iter()
        .find(|(_, aliases)| aliases.contains(&lower.as_str()) || aliases.contains(&key))
        .map(|(canonical, _)| (*canonical).to_string())
}

fn key_label(key: &str) -> String {
    if let Some((_, label)) = SIDED_MODIFIER_KEYS.iter().find(|(code, _)| *code == key) {
        return (*label).to_string();
    }
    match key {
        "Enter" => "Return".to_string(),
        "Up" => "↑".to_string(),
        "Down" => "↓".to_string(),
        "Left" => "←".to_string(),
        "Right" => "→".to_string(),
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_are_emitted_in_fixed_order() {
        let accel = Accelerator::parse("Shift+Alt+Ctrl+k").unwrap();
        assert_eq!(accel.to_string(), "CommandOrControl+Alt+Shift+K");
    }

    #[test]
    fn single_function_key() {
        let accel = Accelerator::parse("f13").unwrap();
        assert_eq!(accel.to_string(), "F13");
        assert!(accel.modifiers().is_empty());
    }

    #[test]
    fn sided_modifier_is_a_main_key() {
        let accel = Accelerator::parse("shiftright").unwrap();
        assert_eq!(accel.to_string(), "ShiftRight");
        assert!(accel.is_sided_modifier());
        assert_eq!(accel.display_names(), vec!["Right Shift"]);

        let combo = Accelerator::parse("CommandOrControl+AltRight").unwrap();
        assert_eq!(combo.to_string(), "CommandOrControl+AltRight");
    }

    #[test]
    fn aliases_collapse_to_command_or_control() {
        for input in ["Ctrl+Space", "Cmd+Space", "CmdOrCtrl+space", "Super+Space"] {
            assert_eq!(canonicalize(input), "CommandOrControl+Space", "{input}");
        }
    }

    #[test]
    fn duplicate_modifiers_collapse() {
        let accel = Accelerator::parse("Shift+Shift+A").unwrap();
        assert_eq!(accel.to_string(), "Shift+A");
    }

    #[test]
    fn dom_codes_are_accepted() {
        assert_eq!(canonicalize("Alt+KeyR"), "Alt+R");
        assert_eq!(canonicalize("Alt+Digit3"), "Alt+3");
        assert_eq!(canonicalize("ArrowUp"), "Up");
    }

    #[test]
    fn modifier_only_is_rejected() {
        assert!(matches!(
            Accelerator::parse("Ctrl+Shift"),
            Err(AcceleratorError::MissingKey(_))
        ));
    }

    #[test]
    fn two_main_keys_are_rejected() {
        assert!(matches!(
            Accelerator::parse("A+B"),
            Err(AcceleratorError::MultipleKeys(_))
        ));
    }

    #[test]
    fn empty_and_dangling_parts_are_rejected() {
        assert!(matches!(Accelerator::parse("  "), Err(AcceleratorError::Empty)));
        assert!(matches!(
            Accelerator::parse("Ctrl++A"),
            Err(AcceleratorError::EmptyPart(_))
        ));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            Accelerator::parse("Ctrl+Banana"),
            Err(AcceleratorError::UnknownKey(_))
        ));
        assert!(Accelerator::parse("F25").is_err());
    }

    #[test]
    fn key_codes_for_event_synthesis() {
        assert_eq!(Accelerator::parse("A").unwrap().key_code(), "KeyA");
        assert_eq!(Accelerator::parse("7").unwrap().key_code(), "Digit7");
        assert_eq!(Accelerator::parse("Left").unwrap().key_code(), "ArrowLeft");
        assert_eq!(Accelerator::parse("Space").unwrap().key_code(), "Space");
    }

    #[test]
    fn display_names_use_labels() {
        let accel = Accelerator::parse("CommandOrControl+Shift+Enter").unwrap();
        assert_eq!(accel.display_names(), vec!["Ctrl", "Shift", "Return"]);
    }

    #[test]
    fn canonicalize_keeps_unparseable_input() {
        assert_eq!(canonicalize(" Hyper+Q "), "Hyper+Q");
    }
}
