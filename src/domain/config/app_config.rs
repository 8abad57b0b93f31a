//! Application configuration value object

use serde::{Deserialize, Serialize};

use super::prompts::{PromptTemplate, DEFAULT_PROMPT_ID};
use crate::domain::shortcut::{default_bindings, shortcut_ids, ShortcutBinding};

/// Default log filter when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output and post-processing settings for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub apply_dictionary: Option<bool>,
    pub apply_filtering: Option<bool>,
    pub auto_copy: Option<bool>,
    pub auto_paste: Option<bool>,
    pub insertion_method: Option<String>,
}

/// Language-model enhancement settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancementSettings {
    pub enabled: Option<bool>,
    pub model: Option<String>,
    pub prompt_id: Option<String>,
    pub custom_prompts: Option<Vec<PromptTemplate>>,
}

/// Persisted accelerators per binding id. An empty string disables a binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutSettings {
    pub toggle_recording: Option<String>,
    pub toggle_recording_alt: Option<String>,
    pub copy_last: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine_socket: Option<String>,
    pub log_level: Option<String>,
    pub play_sounds: Option<bool>,
    pub notify: Option<bool>,
    pub pipeline: Option<PipelineSettings>,
    pub enhancement: Option<EnhancementSettings>,
    pub shortcuts: Option<ShortcutSettings>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        let bindings = default_bindings();
        let accelerator_of = |id: &str| {
            bindings
                .iter()
                .find(|b| b.id == id)
                .map(|b| b.accelerator.clone())
        };

        Self {
            engine_socket: None,
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            play_sounds: Some(true),
            notify: Some(false),
            pipeline: Some(PipelineSettings {
                apply_dictionary: Some(true),
                apply_filtering: Some(true),
                auto_copy: Some(false),
                auto_paste: Some(true),
                insertion_method: Some("paste".to_string()),
            }),
            enhancement: Some(EnhancementSettings {
                enabled: Some(false),
                model: Some("llama3.2".to_string()),
                prompt_id: Some(DEFAULT_PROMPT_ID.to_string()),
                custom_prompts: None,
            }),
            shortcuts: Some(ShortcutSettings {
                toggle_recording: accelerator_of(shortcut_ids::TOGGLE_RECORDING),
                toggle_recording_alt: accelerator_of(shortcut_ids::TOGGLE_RECORDING_ALT),
                copy_last: accelerator_of(shortcut_ids::COPY_LAST),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            engine_socket: other.engine_socket.or(self.engine_socket),
            log_level: other.log_level.or(self.log_level),
            play_sounds: other.play_sounds.or(self.play_sounds),
            notify: other.notify.or(self.notify),
            pipeline: merge_section(self.pipeline, other.pipeline, |b, o| PipelineSettings {
                apply_dictionary: o.apply_dictionary.or(b.apply_dictionary),
                apply_filtering: o.apply_filtering.or(b.apply_filtering),
                auto_copy: o.auto_copy.or(b.auto_copy),
                auto_paste: o.auto_paste.or(b.auto_paste),
                insertion_method: o.insertion_method.or(b.insertion_method),
            }),
            enhancement: merge_section(self.enhancement, other.enhancement, |b, o| {
                EnhancementSettings {
                    enabled: o.enabled.or(b.enabled),
                    model: o.model.or(b.model),
                    prompt_id: o.prompt_id.or(b.prompt_id),
                    custom_prompts: o.custom_prompts.or(b.custom_prompts),
                }
            }),
            shortcuts: merge_section(self.shortcuts, other.shortcuts, |b, o| ShortcutSettings {
                toggle_recording: o.toggle_recording.or(b.toggle_recording),
                toggle_recording_alt: o.toggle_recording_alt.or(b.toggle_recording_alt),
                copy_last: o.copy_last.or(b.copy_last),
            }),
        }
    }

    /// Get log level, or "info" if not set
    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Get play_sounds setting, or true if not set
    pub fn play_sounds_or_default(&self) -> bool {
        self.play_sounds.unwrap_or(true)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Selected enhancement template id, or the default one
    pub fn prompt_id_or_default(&self) -> &str {
        self.enhancement
            .as_ref()
            .and_then(|e| e.prompt_id.as_deref())
            .unwrap_or(DEFAULT_PROMPT_ID)
    }

    /// User-defined enhancement templates
    pub fn custom_prompts(&self) -> &[PromptTemplate] {
        self.enhancement
            .as_ref()
            .and_then(|e| e.custom_prompts.as_deref())
            .unwrap_or(&[])
    }

    /// Persisted accelerator for a binding id, if any
    pub fn shortcut_accelerator(&self, id: &str) -> Option<&str> {
        let shortcuts = self.shortcuts.as_ref()?;
        match id {
            shortcut_ids::TOGGLE_RECORDING => shortcuts.toggle_recording.as_deref(),
            shortcut_ids::TOGGLE_RECORDING_ALT => shortcuts.toggle_recording_alt.as_deref(),
            shortcut_ids::COPY_LAST => shortcuts.copy_last.as_deref(),
            _ => None,
        }
    }

    /// Store an accelerator for a binding id. Returns false for unknown ids.
    pub fn set_shortcut_accelerator(&mut self, id: &str, accelerator: &str) -> bool {
        let shortcuts = self.shortcuts.get_or_insert_with(ShortcutSettings::default);
        let slot = match id {
            shortcut_ids::TOGGLE_RECORDING => &mut shortcuts.toggle_recording,
            shortcut_ids::TOGGLE_RECORDING_ALT => &mut shortcuts.toggle_recording_alt,
            shortcut_ids::COPY_LAST => &mut shortcuts.copy_last,
            _ => return false,
        };
        *slot = Some(accelerator.to_string());
        true
    }

    /// Bindings to register at startup, in default order.
    ///
    /// Persisted accelerators override defaults; empty ones drop the binding.
    pub fn shortcut_bindings(&self) -> Vec<ShortcutBinding> {
        default_bindings()
            .into_iter()
            .filter_map(|mut binding| {
                if let Some(accelerator) = self.shortcut_accelerator(&binding.id) {
                    binding.accelerator = accelerator.trim().to_string();
                }
                (!binding.accelerator.is_empty()).then_some(binding)
            })
            .collect()
    }
}

fn merge_section<T>(base: Option<T>, other: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, other) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(b), Some(o)) => Some(merge(b, o)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.engine_socket.is_none());
        assert_eq!(config.log_level_or_default(), "info");
        assert!(config.play_sounds_or_default());
        assert!(!config.notify_or_default());
        assert_eq!(config.prompt_id_or_default(), "fix-grammar");
        assert_eq!(
            config.shortcut_accelerator(shortcut_ids::TOGGLE_RECORDING),
            Some("F13")
        );
        let pipeline = config.pipeline.as_ref().unwrap();
        assert_eq!(pipeline.auto_paste, Some(true));
        assert_eq!(pipeline.auto_copy, Some(false));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.play_sounds.is_none());
        assert!(config.pipeline.is_none());
        assert!(config.shortcuts.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            log_level: Some("info".to_string()),
            play_sounds: Some(true),
            ..Default::default()
        };
        let other = AppConfig {
            log_level: Some("debug".to_string()),
            play_sounds: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert_eq!(merged.play_sounds, Some(true));
    }

    #[test]
    fn merge_sections_field_by_field() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            enhancement: Some(EnhancementSettings {
                prompt_id: Some("summarise".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        let enhancement = merged.enhancement.as_ref().unwrap();
        assert_eq!(enhancement.prompt_id.as_deref(), Some("summarise"));
        assert_eq!(enhancement.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn shortcut_bindings_apply_overrides() {
        let mut config = AppConfig::defaults();
        assert!(config.set_shortcut_accelerator(shortcut_ids::TOGGLE_RECORDING, "F15"));

        let bindings = config.shortcut_bindings();
        let toggle = bindings
            .iter()
            .find(|b| b.id == shortcut_ids::TOGGLE_RECORDING)
            .unwrap();
        assert_eq!(toggle.accelerator, "F15");
    }

    #[test]
    fn empty_accelerator_disables_binding() {
        let mut config = AppConfig::defaults();
        config.set_shortcut_accelerator(shortcut_ids::COPY_LAST, "");

        let bindings = config.shortcut_bindings();
        assert!(bindings.iter().all(|b| b.id != shortcut_ids::COPY_LAST));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn unknown_shortcut_id_is_rejected() {
        let mut config = AppConfig::empty();
        assert!(!config.set_shortcut_accelerator("launch_rockets", "F1"));
        assert!(config.shortcuts.as_ref().unwrap().toggle_recording.is_none());
    }

    #[test]
    fn empty_config_yields_default_bindings() {
        let bindings = AppConfig::empty().shortcut_bindings();
        assert_eq!(bindings, default_bindings());
    }
}
