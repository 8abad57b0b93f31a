//! Shortcut capture session and key event types

use serde::{Deserialize, Serialize};

use crate::domain::shortcut::{Accelerator, Modifier, ShortcutBinding};

/// How keys reach the engine while capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureTransport {
    /// Engine polls OS-level key state itself
    #[serde(rename = "native")]
    Privileged,
    /// Keys come from our own input and are forwarded one by one
    #[serde(rename = "webview")]
    Fallback,
}

impl CaptureTransport {
    /// Wire name used by the engine
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privileged => "native",
            Self::Fallback => "webview",
        }
    }

    /// Whether key events must be forwarded to the engine
    pub fn forwards_keys(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl std::fmt::Display for CaptureTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Privileged => write!(f, "privileged"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Modifier flags attached to a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventKind {
    #[serde(rename = "keydown")]
    Down,
    #[serde(rename = "keyup")]
    Up,
}

/// One key transition, as forwarded in fallback mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Logical key value, e.g. "a" or "Shift"
    pub key: String,
    /// Physical key code, e.g. "KeyA" or "ShiftLeft"
    pub code: String,
    #[serde(flatten)]
    pub modifiers: KeyModifiers,
    #[serde(rename = "type")]
    pub kind: KeyEventKind,
}

/// Bare modifiers as `(code prefix, preview label)`, in preview order
const MODIFIER_LABELS: &[(&str, &str)] = &[
    ("Control", "Ctrl"),
    ("Meta", "Super"),
    ("Alt", "Alt"),
    ("Shift", "Shift"),
];

impl KeyEvent {
    pub fn down(key: impl Into<String>, code: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            modifiers,
            kind: KeyEventKind::Down,
        }
    }

    pub fn up(key: impl Into<String>, code: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            modifiers,
            kind: KeyEventKind::Up,
        }
    }

    /// Transitions that type `accelerator`: modifiers down, main key down
    /// and up, then modifiers released in reverse
    pub fn sequence_for(accelerator: &Accelerator) -> Vec<Self> {
        let mut held = KeyModifiers::none();
        let mut pressed = Vec::new();
        let mut events = Vec::new();

        for &modifier in accelerator.modifiers() {
            let (key, code) = modifier_key(modifier);
            set_flag(&mut held, modifier, true);
            pressed.push(modifier);
            events.push(Self::down(key, code, held));
        }

        let code = accelerator.key_code();
        events.push(Self::down(accelerator.key(), code.as_str(), held));
        events.push(Self::up(accelerator.key(), code, held));

        for modifier in pressed.into_iter().rev() {
            let (key, code) = modifier_key(modifier);
            set_flag(&mut held, modifier, false);
            events.push(Self::up(key, code, held));
        }
        events
    }

    /// Escape always cancels capture
    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.code == "Escape"
    }

    /// Preview label if this event is a bare modifier key
    pub fn modifier_label(&self) -> Option<&'static str> {
        MODIFIER_LABELS
            .iter()
            .find(|(prefix, _)| {
                self.key == *prefix
                    || self
                        .code
                        .strip_prefix(prefix)
                        .is_some_and(|side| side.is_empty() || side == "Left" || side == "Right")
            })
            .map(|(_, label)| *label)
    }
}

fn modifier_key(modifier: Modifier) -> (&'static str, &'static str) {
    match modifier {
        Modifier::CommandOrControl => ("Control", "ControlLeft"),
        Modifier::Alt => ("Alt", "AltLeft"),
        Modifier::Shift => ("Shift", "ShiftLeft"),
    }
}

fn set_flag(flags: &mut KeyModifiers, modifier: Modifier, down: bool) {
    match modifier {
        Modifier::CommandOrControl => flags.ctrl = down,
        Modifier::Alt => flags.alt = down,
        Modifier::Shift => flags.shift = down,
    }
}

/// Engine-reported capture progress (`key-capture-update` and
/// `key-capture-complete` share this shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyCapture {
    pub keys: Vec<String>,
    pub accelerator: String,
    pub is_valid: bool,
}

/// Live preview while keys are held
pub type KeyCaptureUpdate = KeyCapture;

/// Final combination, sent once per capture
pub type KeyCaptureComplete = KeyCapture;

/// State held while a new accelerator is being captured.
///
/// Exists only between entering and leaving capture mode.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    binding_id: String,
    transport: CaptureTransport,
    held_keys: Vec<String>,
    suspended: Vec<ShortcutBinding>,
    original: Option<ShortcutBinding>,
}

impl CaptureSession {
    pub fn new(
        binding_id: impl Into<String>,
        transport: CaptureTransport,
        suspended: Vec<ShortcutBinding>,
        original: Option<ShortcutBinding>,
    ) -> Self {
        Self {
            binding_id: binding_id.into(),
            transport,
            held_keys: Vec::new(),
            suspended,
            original,
        }
    }

    pub fn binding_id(&self) -> &str {
        &self.binding_id
    }

    pub fn transport(&self) -> CaptureTransport {
        self.transport
    }

    /// Keys shown in the pending preview
    pub fn held_keys(&self) -> &[String] {
        &self.held_keys
    }

    /// Binding being edited, as it was before capture started
    pub fn original(&self) -> Option<&ShortcutBinding> {
        self.original.as_ref()
    }

    /// Bindings that were live when capture started, in registration order
    pub fn suspended(&self) -> &[ShortcutBinding] {
        &self.suspended
    }

    /// Record a held modifier in the preview, keeping a stable order
    pub fn press_modifier(&mut self, label: &str) {
        if self.held_keys.iter().any(|k| k == label) {
            return;
        }
        self.held_keys.push(label.to_string());
        self.held_keys.sort_by_key(|k| {
            MODIFIER_LABELS
                .iter()
                .position(|(_, l)| *l == k.as_str())
                .unwrap_or(MODIFIER_LABELS.len())
        });
    }

    pub fn release_modifier(&mut self, label: &str) {
        self.held_keys.retain(|k| k != label);
    }

    /// Replace the preview with engine-reported keys
    pub fn set_preview(&mut self, keys: Vec<String>) {
        self.held_keys = keys;
    }

    /// Bindings to re-register on exit: the snapshot minus the edited id
    pub fn restore_set(&self) -> Vec<ShortcutBinding> {
        self.suspended
            .iter()
            .filter(|b| b.id != self.binding_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CaptureSession {
        let suspended = vec![
            ShortcutBinding::new("toggle_recording", "F13", "Toggle"),
            ShortcutBinding::new("copy_last", "F14", "Copy"),
        ];
        let original = suspended.first().cloned();
        CaptureSession::new("toggle_recording", CaptureTransport::Fallback, suspended, original)
    }

    #[test]
    fn transport_wire_names() {
        let t: CaptureTransport = serde_json::from_str("\"native\"").unwrap();
        assert_eq!(t, CaptureTransport::Privileged);
        let t: CaptureTransport = serde_json::from_str("\"webview\"").unwrap();
        assert_eq!(t, CaptureTransport::Fallback);
        assert!(t.forwards_keys());
        assert_eq!(t.as_str(), "webview");
    }

    #[test]
    fn bare_modifiers_are_detected() {
        let shift = KeyEvent::down("Shift", "ShiftLeft", KeyModifiers::shift());
        assert_eq!(shift.modifier_label(), Some("Shift"));
        let meta = KeyEvent::down("Meta", "MetaRight", KeyModifiers::none());
        assert_eq!(meta.modifier_label(), Some("Super"));
        let a = KeyEvent::down("A", "KeyA", KeyModifiers::shift());
        assert_eq!(a.modifier_label(), None);
        let alt_graph = KeyEvent::down("AltGraph", "AltGraph", KeyModifiers::none());
        assert_eq!(alt_graph.modifier_label(), None);
    }

    #[test]
    fn escape_is_detected_by_key_or_code() {
        assert!(KeyEvent::down("Escape", "Escape", KeyModifiers::none()).is_escape());
        assert!(!KeyEvent::down("q", "KeyQ", KeyModifiers::none()).is_escape());
    }

    #[test]
    fn key_event_wire_shape() {
        let event = KeyEvent::down("A", "KeyA", KeyModifiers::shift());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["key"], "A");
        assert_eq!(json["code"], "KeyA");
        assert_eq!(json["shift"], true);
        assert_eq!(json["ctrl"], false);
        assert_eq!(json["type"], "keydown");
    }

    #[test]
    fn preview_keeps_modifier_order() {
        let mut s = session();
        s.press_modifier("Shift");
        s.press_modifier("Ctrl");
        s.press_modifier("Shift");
        assert_eq!(s.held_keys(), ["Ctrl", "Shift"]);
        s.release_modifier("Ctrl");
        assert_eq!(s.held_keys(), ["Shift"]);
    }

    #[test]
    fn restore_set_excludes_edited_binding() {
        let s = session();
        let restore = s.restore_set();
        assert_eq!(restore.len(), 1);
        assert_eq!(restore[0].id, "copy_last");
        assert_eq!(s.original().map(|b| b.accelerator.as_str()), Some("F13"));
    }

    #[test]
    fn capture_payload_is_camel_case() {
        let payload: KeyCaptureComplete = serde_json::from_str(
            r#"{"keys":["Ctrl","Shift","R"],"accelerator":"CommandOrControl+Shift+R","isValid":true}"#,
        )
        .unwrap();
        assert!(payload.is_valid);
        assert_eq!(payload.keys.len(), 3);
    }

    #[test]
    fn sequence_for_wraps_main_key_in_modifiers() {
        let accelerator = Accelerator::parse("Ctrl+Shift+K").unwrap();
        let events = KeyEvent::sequence_for(&accelerator);
        let codes: Vec<(&str, KeyEventKind)> =
            events.iter().map(|e| (e.code.as_str(), e.kind)).collect();
        assert_eq!(
            codes,
            [
                ("ControlLeft", KeyEventKind::Down),
                ("ShiftLeft", KeyEventKind::Down),
                ("KeyK", KeyEventKind::Down),
                ("KeyK", KeyEventKind::Up),
                ("ShiftLeft", KeyEventKind::Up),
                ("ControlLeft", KeyEventKind::Up),
            ]
        );
        assert!(events[2].modifiers.ctrl && events[2].modifiers.shift);
        assert_eq!(events[5].modifiers, KeyModifiers::none());
    }

    #[test]
    fn sequence_for_bare_key() {
        let accelerator = Accelerator::parse("F13").unwrap();
        let events = KeyEvent::sequence_for(&accelerator);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].code, "F13");
        assert!(events[0].modifier_label().is_none());
    }
}
