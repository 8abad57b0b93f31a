//! Configuration domain module

mod app_config;
pub mod prompts;

pub use app_config::{
    AppConfig, EnhancementSettings, PipelineSettings, ShortcutSettings, DEFAULT_LOG_LEVEL,
};
pub use prompts::{builtin_prompts, resolve_prompt, PromptTemplate};
