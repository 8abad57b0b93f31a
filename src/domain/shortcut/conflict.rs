//! Registration conflicts and alternative suggestions

use serde::{Deserialize, Serialize};

use super::accelerator::{canonicalize, Accelerator};
use crate::domain::error::AcceleratorError;

/// Maximum number of alternatives offered for one conflict
pub const MAX_SUGGESTIONS: usize = 5;

const MODIFIER_COMBOS: &[&str] = &[
    "CommandOrControl+Shift",
    "CommandOrControl+Alt",
    "CommandOrControl+Shift+Alt",
    "Alt+Shift",
    "Ctrl+Shift",
    "Ctrl+Alt",
];

const SINGLE_KEYS: &[&str] = &["F13", "F14", "F15", "F16", "F17", "F18", "F19", "F20"];

const BASE_KEYS: &[&str] = &["Space", "R", "T", "M", "J", "K", "L", "Semicolon"];

/// Why a registration was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    AlreadyRegistered,
    InvalidFormat,
    Permission,
    Reserved,
    Other,
}

impl ConflictKind {
    /// User-facing explanation. `raw` is the message reported by the engine.
    pub fn describe(&self, raw: &str) -> String {
        match self {
            Self::AlreadyRegistered => {
                "This shortcut is already registered by another application.".to_string()
            }
            Self::InvalidFormat => {
                "This shortcut format is not recognised. Please use a valid key combination."
                    .to_string()
            }
            Self::Permission => {
                "Input monitoring permission is required to register global shortcuts."
                    .to_string()
            }
            Self::Reserved => "This shortcut is reserved by the operating system.".to_string(),
            Self::Other => format!("Failed to register shortcut. The system reported: {raw}"),
        }
    }
}

/// A refused registration, with alternatives the user could try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutConflict {
    pub shortcut_id: String,
    pub accelerator: String,
    pub kind: ConflictKind,
    pub reason: String,
    pub suggestions: Vec<String>,
}

impl ShortcutConflict {
    /// Build a conflict from an engine error message
    pub fn from_engine_error(shortcut_id: &str, accelerator: &str, error: &str) -> Self {
        let kind = classify_error(error);
        Self {
            shortcut_id: shortcut_id.to_string(),
            accelerator: accelerator.to_string(),
            kind,
            reason: kind.describe(error),
            suggestions: suggest_alternatives(accelerator),
        }
    }

    /// The accelerator is already bound locally to another id
    pub fn held_by(shortcut_id: &str, accelerator: &str, holder_id: &str) -> Self {
        Self {
            shortcut_id: shortcut_id.to_string(),
            accelerator: accelerator.to_string(),
            kind: ConflictKind::AlreadyRegistered,
            reason: format!("This shortcut is already used by \"{holder_id}\"."),
            suggestions: suggest_alternatives(accelerator),
        }
    }

    /// The accelerator does not follow the key grammar
    pub fn invalid(shortcut_id: &str, accelerator: &str, error: &AcceleratorError) -> Self {
        Self {
            shortcut_id: shortcut_id.to_string(),
            accelerator: accelerator.to_string(),
            kind: ConflictKind::InvalidFormat,
            reason: error.to_string(),
            suggestions: suggest_alternatives(accelerator),
        }
    }
}

/// Outcome of registering one binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationResult {
    Registered {
        shortcut_id: String,
        accelerator: String,
    },
    Conflict(ShortcutConflict),
}

impl RegistrationResult {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    pub fn shortcut_id(&self) -> &str {
        match self {
            Self::Registered { shortcut_id, .. } => shortcut_id,
            Self::Conflict(conflict) => &conflict.shortcut_id,
        }
    }

    pub fn conflict(&self) -> Option<&ShortcutConflict> {
        match self {
            Self::Registered { .. } => None,
            Self::Conflict(conflict) => Some(conflict),
        }
    }
}

/// Bucket an engine registration error by its message
pub fn classify_error(message: &str) -> ConflictKind {
    let lower = message.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if mentions(&["already registered", "in use"]) {
        ConflictKind::AlreadyRegistered
    } else if mentions(&["invalid", "parse"]) {
        ConflictKind::InvalidFormat
    } else if mentions(&["permission", "access"]) {
        ConflictKind::Permission
    } else if mentions(&["reserved", "system"]) {
        ConflictKind::Reserved
    } else {
        ConflictKind::Other
    }
}

/// Check characters and structure, then parse into a normalised accelerator
pub fn validate_accelerator(input: &str) -> Result<Accelerator, AcceleratorError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AcceleratorError::Empty);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '+' | '-' | '_'))
    {
        return Err(AcceleratorError::InvalidCharacters(trimmed.to_string()));
    }
    if trimmed.starts_with('+') || trimmed.ends_with('+') || trimmed.contains("++") {
        return Err(AcceleratorError::EmptyPart(trimmed.to_string()));
    }
    Accelerator::parse(trimmed)
}

/// Alternatives for an accelerator that could not be registered.
///
/// Returns at most [`MAX_SUGGESTIONS`] canonical accelerators, none equal to
/// the failed one.
pub fn suggest_alternatives(failed: &str) -> Vec<String> {
    let failed_canonical = canonicalize(failed);
    let mut suggestions: Vec<String> = Vec::new();
    let push = |candidate: String, limit: usize, out: &mut Vec<String>| -> bool {
        let candidate = canonicalize(&candidate);
        if candidate != failed_canonical && !out.contains(&candidate) {
            out.push(candidate);
        }
        out.len() >= limit
    };

    let lower = failed.trim().to_lowercase();
    if lower.starts_with('f') && lower.len() <= 3 {
        for key in SINGLE_KEYS {
            if push((*key).to_string(), 3, &mut suggestions) {
                break;
            }
        }
    }

    if let Some((modifiers, base_key)) = failed.trim().rsplit_once('+') {
        for combo in MODIFIER_COMBOS {
            if push(format!("{combo}+{base_key}"), 3, &mut suggestions) {
                break;
            }
        }
        if suggestions.len() < 3 {
            for key in BASE_KEYS {
                if push(format!("{modifiers}+{key}"), MAX_SUGGESTIONS, &mut suggestions) {
                    break;
                }
            }
        }
    }

    if suggestions.len() < MAX_SUGGESTIONS {
        for key in SINGLE_KEYS {
            if push((*key).to_string(), MAX_SUGGESTIONS, &mut suggestions) {
                break;
            }
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
