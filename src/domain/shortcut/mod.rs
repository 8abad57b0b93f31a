//! Global shortcut domain module

mod accelerator;
mod binding;
mod conflict;

pub use accelerator::{canonicalize, is_sided_modifier_key, Accelerator, Modifier};
pub use binding::{default_bindings, shortcut_ids, ShortcutBinding};
pub use conflict::{
    classify_error, suggest_alternatives, validate_accelerator, ConflictKind, RegistrationResult,
    ShortcutConflict, MAX_SUGGESTIONS,
};
