//! Per-run pipeline configuration

use serde::{Deserialize, Serialize};

use crate::domain::config::{resolve_prompt, AppConfig};

/// Fully-resolved configuration sent to the engine with every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub apply_dictionary: bool,
    pub apply_filtering: bool,
    pub enhancement_enabled: bool,
    pub enhancement_model: String,
    /// Prompt text, already resolved from the selected template id
    pub enhancement_prompt: String,
    pub auto_copy: bool,
    pub auto_paste: bool,
    /// "paste" or "typing"
    pub insertion_method: String,
}

impl PipelineConfig {
    /// Resolve the run configuration from persisted settings.
    ///
    /// Call this per run: the prompt follows whatever template is selected now.
    pub fn from_settings(config: &AppConfig) -> Self {
        let defaults = AppConfig::defaults().merge(config.clone());
        let pipeline = defaults.pipeline.clone().unwrap_or_default();
        let enhancement = defaults.enhancement.clone().unwrap_or_default();

        Self {
            apply_dictionary: pipeline.apply_dictionary.unwrap_or(true),
            apply_filtering: pipeline.apply_filtering.unwrap_or(true),
            enhancement_enabled: enhancement.enabled.unwrap_or(false),
            enhancement_model: enhancement
                .model
                .unwrap_or_else(|| "llama3.2".to_string()),
            enhancement_prompt: resolve_prompt(
                defaults.prompt_id_or_default(),
                defaults.custom_prompts(),
            ),
            auto_copy: pipeline.auto_copy.unwrap_or(false),
            auto_paste: pipeline.auto_paste.unwrap_or(true),
            insertion_method: pipeline
                .insertion_method
                .unwrap_or_else(|| "paste".to_string()),
        }
    }

    /// Overlay caller-supplied values
    pub fn with_overrides(self, overrides: &PipelineOverrides) -> Self {
        Self {
            apply_dictionary: overrides.apply_dictionary.unwrap_or(self.apply_dictionary),
            apply_filtering: overrides.apply_filtering.unwrap_or(self.apply_filtering),
            enhancement_enabled: overrides
                .enhancement_enabled
                .unwrap_or(self.enhancement_enabled),
            enhancement_model: overrides
                .enhancement_model
                .clone()
                .unwrap_or(self.enhancement_model),
            enhancement_prompt: overrides
                .enhancement_prompt
                .clone()
                .unwrap_or(self.enhancement_prompt),
            auto_copy: overrides.auto_copy.unwrap_or(self.auto_copy),
            auto_paste: overrides.auto_paste.unwrap_or(self.auto_paste),
            insertion_method: self.insertion_method,
        }
    }

    /// Imported files have no cursor to paste into
    pub fn without_output(self) -> Self {
        Self {
            auto_copy: false,
            auto_paste: false,
            ..self
        }
    }
}

/// Partial configuration supplied by a caller of stop-and-process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOverrides {
    pub apply_dictionary: Option<bool>,
    pub apply_filtering: Option<bool>,
    pub enhancement_enabled: Option<bool>,
    pub enhancement_model: Option<String>,
    pub enhancement_prompt: Option<String>,
    pub auto_copy: Option<bool>,
    pub auto_paste: Option<bool>,
}
