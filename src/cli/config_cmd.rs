//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, EnhancementSettings, PipelineSettings};
use crate::domain::error::ConfigError;
use crate::domain::shortcut::validate_accelerator;

use super::args::{
    is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS, VALID_INSERTION_METHODS,
    VALID_LOG_LEVELS,
};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let mut config = store.load().await?;
    let stored = set_value(&mut config, key, value)?;
    store.save(&config).await?;

    presenter.success(&format!("{} = {}", key, stored));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = get_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    let custom = config.custom_prompts();
    if !custom.is_empty() {
        let ids: Vec<&str> = custom.iter().map(|p| p.id.as_str()).collect();
        presenter.key_value("enhancement.custom_prompts", &ids.join(", "));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Read one dotted key from a config
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    let pipeline = config.pipeline.as_ref();
    let enhancement = config.enhancement.as_ref();
    let flag = |b: Option<bool>| b.map(|b| b.to_string());

    match key {
        "engine_socket" => config.engine_socket.clone(),
        "log_level" => config.log_level.clone(),
        "play_sounds" => flag(config.play_sounds),
        "notify" => flag(config.notify),
        "pipeline.apply_dictionary" => flag(pipeline.and_then(|p| p.apply_dictionary)),
        "pipeline.apply_filtering" => flag(pipeline.and_then(|p| p.apply_filtering)),
        "pipeline.auto_copy" => flag(pipeline.and_then(|p| p.auto_copy)),
        "pipeline.auto_paste" => flag(pipeline.and_then(|p| p.auto_paste)),
        "pipeline.insertion_method" => pipeline.and_then(|p| p.insertion_method.clone()),
        "enhancement.enabled" => flag(enhancement.and_then(|e| e.enabled)),
        "enhancement.model" => enhancement.and_then(|e| e.model.clone()),
        "enhancement.prompt_id" => enhancement.and_then(|e| e.prompt_id.clone()),
        _ => key
            .strip_prefix("shortcuts.")
            .and_then(|id| config.shortcut_accelerator(id))
            .map(|accel| {
                if accel.is_empty() {
                    "(disabled)".to_string()
                } else {
                    accel.to_string()
                }
            }),
    }
}

/// Validate and store one dotted key. Returns the value as stored.
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let flag = || {
        parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'".to_string()))
    };
    let one_of = |valid: &[&str]| {
        let lower = value.to_lowercase();
        if valid.contains(&lower.as_str()) {
            Ok(lower)
        } else {
            Err(invalid(format!(
                "Invalid value '{}'. Valid options: {}",
                value,
                valid.join(", ")
            )))
        }
    };

    match key {
        "engine_socket" => {
            config.engine_socket = Some(value.to_string());
            Ok(value.to_string())
        }
        "log_level" => {
            let level = one_of(VALID_LOG_LEVELS)?;
            config.log_level = Some(level.clone());
            Ok(level)
        }
        "play_sounds" => {
            config.play_sounds = Some(flag()?);
            Ok(value.to_string())
        }
        "notify" => {
            config.notify = Some(flag()?);
            Ok(value.to_string())
        }
        "pipeline.apply_dictionary"
        | "pipeline.apply_filtering"
        | "pipeline.auto_copy"
        | "pipeline.auto_paste" => {
            let enabled = flag()?;
            let pipeline = config.pipeline.get_or_insert_with(PipelineSettings::default);
            let slot = match key {
                "pipeline.apply_dictionary" => &mut pipeline.apply_dictionary,
                "pipeline.apply_filtering" => &mut pipeline.apply_filtering,
                "pipeline.auto_copy" => &mut pipeline.auto_copy,
                _ => &mut pipeline.auto_paste,
            };
            *slot = Some(enabled);
            Ok(enabled.to_string())
        }
        "pipeline.insertion_method" => {
            let method = one_of(VALID_INSERTION_METHODS)?;
            config
                .pipeline
                .get_or_insert_with(PipelineSettings::default)
                .insertion_method = Some(method.clone());
            Ok(method)
        }
        "enhancement.enabled" => {
            let enabled = flag()?;
            config
                .enhancement
                .get_or_insert_with(EnhancementSettings::default)
                .enabled = Some(enabled);
            Ok(enabled.to_string())
        }
        "enhancement.model" => {
            if value.trim().is_empty() {
                return Err(invalid("Model name cannot be empty".to_string()));
            }
            config
                .enhancement
                .get_or_insert_with(EnhancementSettings::default)
                .model = Some(value.trim().to_string());
            Ok(value.trim().to_string())
        }
        "enhancement.prompt_id" => {
            let known = crate::domain::config::builtin_prompts()
                .into_iter()
                .chain(config.custom_prompts().iter().cloned())
                .any(|p| p.id == value);
            if !known {
                return Err(invalid(format!("Unknown prompt template '{}'", value)));
            }
            config
                .enhancement
                .get_or_insert_with(EnhancementSettings::default)
                .prompt_id = Some(value.to_string());
            Ok(value.to_string())
        }
        _ => {
            let id = key
                .strip_prefix("shortcuts.")
                .ok_or_else(|| invalid("Unknown key".to_string()))?;
            // An empty accelerator disables the binding
            let accelerator = if value.trim().is_empty() {
                String::new()
            } else {
                validate_accelerator(value)
                    .map_err(|e| invalid(e.to_string()))?
                    .to_string()
            };
            if !config.set_shortcut_accelerator(id, &accelerator) {
                return Err(invalid("Unknown shortcut id".to_string()));
            }
            Ok(accelerator)
        }
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shortcut::shortcut_ids;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert_eq!(parse_bool("yes"), Ok(true));
        assert_eq!(parse_bool("no"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn every_key_reads_from_defaults() {
        let config = AppConfig::defaults();
        for key in VALID_CONFIG_KEYS {
            if *key == "engine_socket" {
                continue;
            }
            assert!(get_value(&config, key).is_some(), "{key} has no default");
        }
    }

    #[test]
    fn set_nested_flag_creates_section() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "pipeline.auto_copy", "yes").unwrap();
        assert_eq!(config.pipeline.unwrap().auto_copy, Some(true));
    }

    #[test]
    fn set_flag_rejects_garbage() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "notify", "maybe").is_err());
        assert!(config.notify.is_none());
    }

    #[test]
    fn insertion_method_is_normalised() {
        let mut config = AppConfig::empty();
        assert_eq!(
            set_value(&mut config, "pipeline.insertion_method", "Typing").unwrap(),
            "typing"
        );
        assert!(set_value(&mut config, "pipeline.insertion_method", "telepathy").is_err());
    }

    #[test]
    fn shortcut_is_stored_canonically() {
        let mut config = AppConfig::empty();
        let stored = set_value(&mut config, "shortcuts.copy_last", "shift+ctrl+c").unwrap();
        assert_eq!(stored, "CommandOrControl+Shift+C");
        assert_eq!(
            config.shortcut_accelerator(shortcut_ids::COPY_LAST),
            Some("CommandOrControl+Shift+C")
        );
    }

    #[test]
    fn empty_shortcut_disables_binding() {
        let mut config = AppConfig::defaults();
        set_value(&mut config, "shortcuts.copy_last", "").unwrap();
        assert_eq!(
            get_value(&config, "shortcuts.copy_last").as_deref(),
            Some("(disabled)")
        );
        assert!(config
            .shortcut_bindings()
            .iter()
            .all(|b| b.id != shortcut_ids::COPY_LAST));
    }

    #[test]
    fn invalid_shortcut_is_rejected() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "shortcuts.toggle_recording", "Ctrl+Shift").is_err());
    }

    #[test]
    fn prompt_id_must_exist() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "enhancement.prompt_id", "summarise").is_ok());
        assert!(set_value(&mut config, "enhancement.prompt_id", "haiku").is_err());
    }

    #[test]
    fn log_level_is_validated() {
        let mut config = AppConfig::empty();
        assert_eq!(set_value(&mut config, "log_level", "DEBUG").unwrap(), "debug");
        assert!(set_value(&mut config, "log_level", "loud").is_err());
    }

    #[tokio::test]
    async fn set_then_get_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::infrastructure::XdgConfigStore::with_path(dir.path().join("c.toml"));
        let presenter = Presenter::new();

        handle_set(&store, &presenter, "enhancement.model", "mistral")
            .await
            .unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(
            get_value(&config, "enhancement.model").as_deref(),
            Some("mistral")
        );
        assert!(handle_set(&store, &presenter, "bogus", "1").await.is_err());
    }
}
