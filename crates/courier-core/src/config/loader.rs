//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.courier.toml` in the working directory or the
//! user config directory.

use super::types::CourierConfig;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid env var pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.courier.toml`
/// 2. User-level `~/.config/courier/config.toml`
/// 3. Default configuration
///
/// Environment overrides apply on top of whichever source was found.
pub fn load_config(project_dir: &Path) -> Result<CourierConfig, ConfigError> {
    let project_config = project_dir.join(".courier.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = get_user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    finish(CourierConfig::default(), &|name| std::env::var(name).ok())
}

/// Get user config directory path
fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("courier").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<CourierConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, &|name| std::env::var(name).ok())
}

/// Parse, expand, override, and validate a config document
fn parse_config(
    content: &str,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<CourierConfig, ConfigError> {
    let mut config: CourierConfig = toml::from_str(content)?;
    expand_env_vars(&mut config, env)?;
    finish(config, env)
}

fn finish(
    config: CourierConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<CourierConfig, ConfigError> {
    let config = resolve_fallbacks(apply_env_overrides(config, env));
    validate(&config)?;
    Ok(config)
}

/// Expand ${VAR} patterns in credential and URL values
fn expand_env_vars(
    config: &mut CourierConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let env_regex = Regex::new(r"\$\{([^}]+)\}")?;
    // An optional value whose variable is unset counts as absent
    let expand = |value: &mut Option<String>| {
        if let Some(raw) = value.take() {
            let expanded = expand_string(&raw, &env_regex, env);
            if !env_regex.is_match(&expanded) {
                *value = Some(expanded);
            }
        }
    };

    expand(&mut config.llm.api_key);
    expand(&mut config.transport.bot_token);
    expand(&mut config.capabilities.search.api_key);
    expand(&mut config.capabilities.source_control.token);
    expand(&mut config.capabilities.source_control.owner);
    expand(&mut config.capabilities.social.bearer_token);
    expand(&mut config.capabilities.messaging.bot_token);
    expand(&mut config.capabilities.messaging.chat_id);

    config.llm.base_url = expand_string(&config.llm.base_url, &env_regex, env);
    config.llm.model = expand_string(&config.llm.model, &env_regex, env);
    Ok(())
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex, env: &dyn Fn(&str) -> Option<String>) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides
///
/// Supports direct environment variables:
/// - OPENAI_API_KEY / OPENAI_API_BASE_URL / OPENAI_API_MODEL -> llm
/// - TELEGRAM_BOT_TOKEN -> transport.bot_token
/// - TELEGRAM_CHAT_ID -> capabilities.messaging.chat_id
/// - TAVILY_API_KEY -> capabilities.search.api_key
/// - GITHUB_TOKEN / GITHUB_OWNER -> capabilities.source_control
/// - TWITTER_BEARER_TOKEN -> capabilities.social.bearer_token
fn apply_env_overrides(
    mut config: CourierConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> CourierConfig {
    let var = |name: &str| env(name).filter(|v| !v.is_empty());

    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(url) = var("OPENAI_API_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = var("OPENAI_API_MODEL") {
        config.llm.model = model;
    }
    if let Some(token) = var("TELEGRAM_BOT_TOKEN") {
        config.transport.bot_token = Some(token);
    }
    if let Some(chat_id) = var("TELEGRAM_CHAT_ID") {
        config.capabilities.messaging.chat_id = Some(chat_id);
    }
    if let Some(key) = var("TAVILY_API_KEY") {
        config.capabilities.search.api_key = Some(key);
    }
    if let Some(token) = var("GITHUB_TOKEN") {
        config.capabilities.source_control.token = Some(token);
    }
    if let Some(owner) = var("GITHUB_OWNER") {
        config.capabilities.source_control.owner = Some(owner);
    }
    if let Some(token) = var("TWITTER_BEARER_TOKEN") {
        config.capabilities.social.bearer_token = Some(token);
    }

    config
}

/// The messaging capability reuses the transport bot unless told otherwise
fn resolve_fallbacks(mut config: CourierConfig) -> CourierConfig {
    if config.capabilities.messaging.bot_token.is_none() {
        config.capabilities.messaging.bot_token = config.transport.bot_token.clone();
    }
    config
}

/// Reject settings the pipeline cannot honor
fn validate(config: &CourierConfig) -> Result<(), ConfigError> {
    let pipeline = &config.pipeline;
    if pipeline.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.max_attempts must be at least 1".to_string(),
        ));
    }
    if pipeline.rate_limit_base.is_nan() || pipeline.rate_limit_base <= 1.0 {
        return Err(ConfigError::Invalid(format!(
            "pipeline.rate_limit_base must be greater than 1, got {}",
            pipeline.rate_limit_base
        )));
    }
    if pipeline.transport_limit == 0 || pipeline.max_result_chars == 0 {
        return Err(ConfigError::Invalid(
            "pipeline truncation limits must be positive".to_string(),
        ));
    }
    if pipeline.task_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.task_timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Courier Configuration
# Place this file in the working directory as .courier.toml
# or in ~/.config/courier/config.toml for global settings

[llm]
api_key = "${OPENAI_API_KEY}"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
temperature = 0.7
timeout = 60

[transport]
bot_token = "${TELEGRAM_BOT_TOKEN}"
poll_timeout = 25
processing_notice = true

[pipeline]
max_attempts = 3
retry_delay_ms = 1000
rate_limit_base = 1.5
task_timeout_secs = 120
max_result_chars = 1000
transport_limit = 4000

[dialogue]
system_prompt = "You are a helpful assistant. Maintain a natural conversational style."

[capabilities.search]
api_key = "${TAVILY_API_KEY}"
max_results = 3

[capabilities.source_control]
token = "${GITHUB_TOKEN}"
owner = "${GITHUB_OWNER}"
repo = "ai-agent-tasks"

[capabilities.social]
bearer_token = "${TWITTER_BEARER_TOKEN}"

[capabilities.messaging]
chat_id = "${TELEGRAM_CHAT_ID}"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_expand_env_var() {
        let regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
        let env = env_of(&[("TEST_VAR", "test_value")]);
        let result = expand_string("prefix_${TEST_VAR}_suffix", &regex, &env);
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_missing_env_var() {
        let regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
        let result = expand_string("${NONEXISTENT_VAR}", &regex, &env_of(&[]));
        assert_eq!(result, "${NONEXISTENT_VAR}");
    }

    #[test]
    fn test_sample_config_parses() {
        let env = env_of(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TAVILY_API_KEY", "tvly-test"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "777"),
        ]);
        let config = parse_config(sample_config(), &env).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert!(config.capabilities.search.is_ready());
        assert!(config.capabilities.messaging.is_ready());
        assert_eq!(
            config.capabilities.messaging.bot_token.as_deref(),
            Some("123:abc")
        );
        // GITHUB_TOKEN was not set, so the credential is absent
        assert!(config.capabilities.source_control.token.is_none());
        assert!(!config.capabilities.source_control.is_ready());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env = env_of(&[
            ("OPENAI_API_MODEL", "deepseek-chat"),
            ("OPENAI_API_BASE_URL", "https://api.deepseek.com/v1"),
            ("GITHUB_TOKEN", "ghp_env"),
        ]);
        let config = parse_config(
            r#"
            [llm]
            model = "gpt-4o"

            [capabilities.source_control]
            token = "ghp_file"
            owner = "octocat"
            "#,
            &env,
        )
        .unwrap();
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.base_url, "https://api.deepseek.com/v1");
        assert_eq!(
            config.capabilities.source_control.token.as_deref(),
            Some("ghp_env")
        );
        assert!(config.capabilities.source_control.is_ready());
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let env = env_of(&[("OPENAI_API_KEY", "")]);
        let config = finish(CourierConfig::default(), &env).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = parse_config("[pipeline]\nmax_attempts = 0\n", &env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_non_growing_backoff() {
        let err = parse_config("[pipeline]\nrate_limit_base = 1.0\n", &env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("rate_limit_base"));
    }

    #[test]
    fn test_load_from_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".courier.toml"),
            "[pipeline]\nmax_attempts = 4\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.pipeline.max_attempts, 4);
    }

    #[test]
    fn test_parse_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[pipeline\n").unwrap();
        assert!(matches!(
            load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
