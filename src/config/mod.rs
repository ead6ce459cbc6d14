//! Model and logging configuration.
//!
//! Model endpoints are described by small YAML files living in a models
//! directory (`assets/models` by default). Logging is configured from the
//! environment.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Config file picked when nothing else is requested.
pub const DEFAULT_MODEL_CONFIG: &str = "deepseek-chat.yaml";
/// Directory searched for model configs, relative to the working directory.
pub const DEFAULT_MODELS_DIR: &str = "assets/models";
/// Env var naming the model config to use.
pub const MODEL_CONFIG_ENV: &str = "PARADOX_MODEL_CONFIG";
/// Env var overriding the models directory.
pub const MODELS_DIR_ENV: &str = "PARADOX_MODELS_DIR";

const DEFAULT_CHAT_PATH: &str = "/chat/completions";
const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";
const DEFAULT_TIMEOUT_SECONDS: f64 = 90.0;
const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Resolved configuration for one OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: f64,
    pub chat_completions_path: String,
    pub default_temperature: f64,
    pub headers: BTreeMap<String, String>,
}

impl ModelConfig {
    /// Create a config with default path, timeout, temperature and headers.
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            chat_completions_path: DEFAULT_CHAT_PATH.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            headers: default_headers(),
        }
    }

    /// Set the request timeout in seconds
    pub fn with_timeout_seconds(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the default sampling temperature
    pub fn with_default_temperature(mut self, temperature: f64) -> Self {
        self.default_temperature = temperature;
        self
    }

    /// Set the completions path, enforcing a leading `/`
    pub fn with_chat_completions_path(mut self, path: impl AsRef<str>) -> Self {
        self.chat_completions_path = normalize_chat_path(path.as_ref());
        self
    }

    /// Add an extra request header, replacing any header with the same
    /// case-insensitive name
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.chat_completions_path
        )
    }

    /// Request timeout as a [`Duration`].
    ///
    /// Fails for non-positive, NaN, or out-of-range values.
    pub fn timeout(&self) -> AppResult<Duration> {
        if self.timeout_seconds.is_nan() || self.timeout_seconds <= 0.0 {
            return Err(AppError::config(format!(
                "timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }
        Duration::try_from_secs_f64(self.timeout_seconds).map_err(|e| {
            AppError::config(format!(
                "timeout_seconds {} is out of range: {}",
                self.timeout_seconds, e
            ))
        })
    }

    /// Check the invariants required before any call is attempted.
    pub fn validate(&self) -> AppResult<()> {
        if self.provider.trim().is_empty()
            || self.model.trim().is_empty()
            || self.base_url.trim().is_empty()
        {
            return Err(AppError::config("provider/model/base_url are required."));
        }
        if self.api_key.trim().is_empty() {
            return Err(AppError::config("API key is empty."));
        }
        self.timeout()?;
        Ok(())
    }

    /// Parse a model config from YAML text. `origin` is only used in messages.
    pub fn from_yaml_str(text: &str, origin: &Path) -> AppResult<Self> {
        let root: Value = serde_yaml::from_str(text).map_err(|e| {
            AppError::config(format!(
                "Failed to read model config YAML: {}: {}",
                origin.display(),
                e
            ))
        })?;
        let data = match root {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(AppError::config(format!(
                    "Invalid YAML object in {}: expected mapping at root.",
                    origin.display()
                )))
            }
        };

        let provider = text_field(&data, "provider");
        let model = text_field(&data, "model");
        let base_url = text_field(&data, "base_url");
        if provider.is_empty() || model.is_empty() || base_url.is_empty() {
            return Err(AppError::config(format!(
                "Invalid config {}: provider/model/base_url are required.",
                origin.display()
            )));
        }

        let api_key = resolve_api_key(&data, origin)?;

        let chat_path = match data.get("chat_completions_path") {
            Some(v) if !v.is_null() => normalize_chat_path(&scalar_text(v)),
            _ => DEFAULT_CHAT_PATH.to_string(),
        };
        let timeout_seconds =
            number_field(&data, "timeout_seconds", DEFAULT_TIMEOUT_SECONDS, origin)?;
        let default_temperature =
            number_field(&data, "default_temperature", DEFAULT_TEMPERATURE, origin)?;

        let mut headers = BTreeMap::new();
        if let Some(Value::Mapping(raw)) = data.get("headers") {
            for (key, value) in raw {
                let key_text = scalar_text(key);
                let value_text = scalar_text(value);
                if !key_text.is_empty() && !value_text.is_empty() {
                    headers.insert(key_text, value_text);
                }
            }
        }
        if !headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case(CONTENT_TYPE))
        {
            headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        }

        Ok(Self {
            provider,
            model,
            base_url,
            api_key,
            timeout_seconds,
            chat_completions_path: chat_path,
            default_temperature,
            headers,
        })
    }
}

fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
    headers
}

fn normalize_chat_path(raw: &str) -> String {
    let path = raw.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Render a YAML scalar the way a user would read it; collections and null
/// become empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

fn text_field(data: &Mapping, key: &str) -> String {
    data.get(key).map(scalar_text).unwrap_or_default()
}

fn number_field(data: &Mapping, key: &str, default: f64, origin: &Path) -> AppResult<f64> {
    let invalid = || {
        AppError::config(format!(
            "Invalid config {}: {} must be a number.",
            origin.display(),
            key
        ))
    };
    match data.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// An `api_key_env` value wins when the variable is set and non-empty;
/// otherwise the inline `api_key` is used.
fn resolve_api_key(data: &Mapping, origin: &Path) -> AppResult<String> {
    let api_key_env = text_field(data, "api_key_env");
    let inline_key = text_field(data, "api_key");

    let from_env = if api_key_env.is_empty() {
        String::new()
    } else {
        env::var(&api_key_env)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let api_key = if from_env.is_empty() {
        inline_key
    } else {
        from_env
    };

    if api_key.is_empty() {
        let hint = if api_key_env.is_empty() {
            "api_key".to_string()
        } else {
            format!("env {}", api_key_env)
        };
        return Err(AppError::config(format!(
            "API key is empty for {}. Set {} or fill api_key in YAML.",
            origin.display(),
            hint
        )));
    }
    Ok(api_key)
}

/// List YAML model configs (`*.yaml` and `*.yml`) in a directory, sorted by
/// file name. A missing directory yields an empty list.
pub fn list_model_configs(models_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(models_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Locates and loads model configs from a models directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    models_dir: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS_DIR)
    }
}

impl ConfigLoader {
    /// Create a loader rooted at the given models directory
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Create a loader honoring `PARADOX_MODELS_DIR`, loading `.env` first.
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        match env::var(MODELS_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::default(),
        }
    }

    /// Directory this loader searches
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Available config file names
    pub fn list(&self) -> Vec<String> {
        list_model_configs(&self.models_dir)
    }

    /// Resolve which config file to load.
    ///
    /// Order: explicit name or path, `PARADOX_MODEL_CONFIG`, the default
    /// config, then the first config found in the models directory.
    pub fn resolve_path(&self, config: Option<&str>) -> AppResult<PathBuf> {
        let explicit = config.map(str::trim).unwrap_or_default().to_string();
        let candidate = if explicit.is_empty() {
            env::var(MODEL_CONFIG_ENV)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        } else {
            explicit
        };

        if !candidate.is_empty() {
            let raw = PathBuf::from(&candidate);
            if raw.is_file() {
                return Ok(raw);
            }

            let normalized = if candidate.ends_with(".yaml") || candidate.ends_with(".yml") {
                candidate.clone()
            } else {
                format!("{}.yaml", candidate)
            };
            let name_path = self.models_dir.join(&normalized);
            if name_path.is_file() {
                return Ok(name_path);
            }

            let available = self.list();
            let hint = if available.is_empty() {
                "N/A".to_string()
            } else {
                available.join(", ")
            };
            return Err(AppError::config(format!(
                "Model config not found: {}. Try one of: {}",
                candidate, hint
            )));
        }

        let default_path = self.models_dir.join(DEFAULT_MODEL_CONFIG);
        if default_path.is_file() {
            return Ok(default_path);
        }

        match self.list().into_iter().next() {
            Some(first) => Ok(self.models_dir.join(first)),
            None => Err(AppError::config(format!(
                "No model YAML found under {}. Create a config like {}/{}.",
                self.models_dir.display(),
                DEFAULT_MODELS_DIR,
                DEFAULT_MODEL_CONFIG
            ))),
        }
    }

    /// Resolve, read and validate a model config.
    pub fn load(&self, config: Option<&str>) -> AppResult<ModelConfig> {
        let path = self.resolve_path(config)?;
        debug!(path = %path.display(), "Loading model config");

        let text = fs::read_to_string(&path).map_err(|e| {
            AppError::config(format!(
                "Failed to read model config YAML: {}: {}",
                path.display(),
                e
            ))
        })?;
        ModelConfig::from_yaml_str(&text, &path)
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LoggingConfig {
    /// Load logging configuration from `LOG_LEVEL` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> PathBuf {
        PathBuf::from("test.yaml")
    }

    #[test]
    fn test_minimal_yaml_applies_defaults() {
        let yaml = r#"
provider: deepseek
model: deepseek-chat
base_url: https://api.deepseek.com/
api_key: sk-inline
"#;
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();
        assert_eq!(config.provider, "deepseek");
        assert_eq!(config.chat_completions_path, "/chat/completions");
        assert_eq!(config.timeout_seconds, 90.0);
        assert_eq!(config.default_temperature, 0.2);
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(config.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_chat_path_gets_leading_slash() {
        let yaml = r#"
provider: p
model: m
base_url: http://localhost
api_key: k
chat_completions_path: v1/chat/completions
"#;
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();
        assert_eq!(config.chat_completions_path, "/v1/chat/completions");
        assert_eq!(config.endpoint(), "http://localhost/v1/chat/completions");
    }

    #[test]
    fn test_missing_required_fields() {
        let yaml = "provider: p\nmodel: m\napi_key: k\n";
        let err = ModelConfig::from_yaml_str(yaml, &origin()).unwrap_err();
        assert!(err.to_string().contains("provider/model/base_url are required"));
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = ModelConfig::from_yaml_str("- a\n- b\n", &origin()).unwrap_err();
        assert!(err.to_string().contains("expected mapping at root"));
    }

    #[test]
    fn test_empty_inline_key_without_env() {
        let yaml = "provider: p\nmodel: m\nbase_url: http://x\napi_key: '  '\n";
        let err = ModelConfig::from_yaml_str(yaml, &origin()).unwrap_err();
        assert!(err.to_string().contains("Set api_key or fill api_key in YAML"));
    }

    #[test]
    fn test_headers_merge_and_blank_entries_dropped() {
        let yaml = r#"
provider: p
model: m
base_url: http://x
api_key: k
headers:
  X-Team: research
  X-Empty: ""
  Content-Type: application/json; charset=utf-8
"#;
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("research"));
        assert!(!config.headers.contains_key("X-Empty"));
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_numeric_fields_accept_strings() {
        let yaml = r#"
provider: p
model: m
base_url: http://x
api_key: k
timeout_seconds: "30"
default_temperature: 0.7
"#;
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.default_temperature, 0.7);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let yaml = "provider: p\nmodel: m\nbase_url: http://x\napi_key: k\ntimeout_seconds: soon\n";
        let err = ModelConfig::from_yaml_str(yaml, &origin()).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_out_of_range_timeout_is_config_error() {
        let yaml = "provider: p\nmodel: m\nbase_url: http://x\napi_key: k\ntimeout_seconds: 1e300\n";
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();

        let err = config.timeout().unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        assert!(err.to_string().contains("out of range"));
        assert!(matches!(config.validate(), Err(AppError::Config { .. })));
    }

    #[test]
    fn test_non_positive_timeout_is_rejected() {
        for seconds in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = ModelConfig::new("p", "m", "http://x", "k").with_timeout_seconds(seconds);
            assert!(config.timeout().is_err(), "accepted {seconds}");
            assert!(config.validate().is_err(), "validated {seconds}");
        }
    }

    #[test]
    fn test_lowercase_content_type_is_not_duplicated() {
        let yaml = r#"
provider: p
model: m
base_url: http://x
api_key: k
headers:
  content-type: application/json; charset=utf-8
"#;
        let config = ModelConfig::from_yaml_str(yaml, &origin()).unwrap();
        let content_types: Vec<&String> = config
            .headers
            .keys()
            .filter(|key| key.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types, vec!["content-type"]);
        assert_eq!(
            config.headers.get("content-type").map(String::as_str),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_with_header_replaces_case_insensitively() {
        let config = ModelConfig::new("p", "m", "http://x", "k")
            .with_header("content-type", "text/plain");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(
            config.headers.get("content-type").map(String::as_str),
            Some("text/plain")
        );
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = ModelConfig::new("p", "m", "http://x", "");
        assert!(config.validate().is_err());

        let config = ModelConfig::new("p", "m", "http://x", "k");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_list_model_configs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.yml"), "").unwrap();
        fs::write(dir.path().join("a.yaml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(list_model_configs(dir.path()), vec!["a.yaml", "b.yml"]);
        assert!(list_model_configs(&dir.path().join("missing")).is_empty());
    }
}
