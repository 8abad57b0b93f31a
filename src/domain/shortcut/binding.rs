//! Hotkey bindings

use serde::{Deserialize, Serialize};

/// Stable binding identifiers
pub mod shortcut_ids {
    pub const TOGGLE_RECORDING: &str = "toggle_recording";
    pub const TOGGLE_RECORDING_ALT: &str = "toggle_recording_alt";
    pub const COPY_LAST: &str = "copy_last";

    /// Every id known to the settings file, in registration order
    pub const ALL: &[&str] = &[TOGGLE_RECORDING, TOGGLE_RECORDING_ALT, COPY_LAST];

    /// Whether a fired binding should toggle the recording pipeline
    pub fn is_toggle(id: &str) -> bool {
        id == TOGGLE_RECORDING || id == TOGGLE_RECORDING_ALT
    }
}

/// One global hotkey and its registration status with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutBinding {
    pub id: String,
    pub accelerator: String,
    pub description: String,
    #[serde(default)]
    pub registered: bool,
}

impl ShortcutBinding {
    /// Create an unregistered binding
    pub fn new(
        id: impl Into<String>,
        accelerator: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            accelerator: accelerator.into(),
            description: description.into(),
            registered: false,
        }
    }

    /// Copy of this binding pointing at another accelerator
    pub fn with_accelerator(&self, accelerator: impl Into<String>) -> Self {
        Self {
            accelerator: accelerator.into(),
            registered: false,
            ..self.clone()
        }
    }
}

/// Bindings shipped out of the box
pub fn default_bindings() -> Vec<ShortcutBinding> {
    vec![
        ShortcutBinding::new(
            shortcut_ids::TOGGLE_RECORDING,
            "F13",
            "Start or stop recording",
        ),
        ShortcutBinding::new(
            shortcut_ids::TOGGLE_RECORDING_ALT,
            "ShiftRight",
            "Start or stop recording (alternative)",
        ),
        ShortcutBinding::new(
            shortcut_ids::COPY_LAST,
            "F14",
            "Copy the last transcription",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_unregistered() {
        let bindings = default_bindings();
        assert_eq!(bindings.len(), 3);
        assert!(bindings.iter().all(|b| !b.registered));
        assert_eq!(bindings[0].id, shortcut_ids::TOGGLE_RECORDING);
        assert_eq!(bindings[1].accelerator, "ShiftRight");
    }

    #[test]
    fn default_ids_match_known_ids() {
        let ids: Vec<String> = default_bindings().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, shortcut_ids::ALL);
    }

    #[test]
    fn only_recording_ids_toggle() {
        assert!(shortcut_ids::is_toggle("toggle_recording"));
        assert!(shortcut_ids::is_toggle("toggle_recording_alt"));
        assert!(!shortcut_ids::is_toggle("copy_last"));
    }

    #[test]
    fn with_accelerator_clears_registration() {
        let mut binding = ShortcutBinding::new("copy_last", "F14", "Copy");
        binding.registered = true;
        let moved = binding.with_accelerator("F15");
        assert_eq!(moved.accelerator, "F15");
        assert_eq!(moved.id, "copy_last");
        assert!(!moved.registered);
    }
}
