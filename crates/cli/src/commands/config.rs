use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cardline_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => render(&config, detect_config_path().as_deref()),
        Err(error) => format!("config validation failed: {error}"),
    }
}

/// Renders every effective setting with the layer it came from; secrets never print.
pub fn render(config: &AppConfig, config_file_path: Option<&Path>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path);
    let source = |key: &str, env_keys: &[&str]| {
        field_source(key, env_keys, config_file_doc.as_ref(), config_file_path)
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider),
        source("llm.provider", &["CARDLINE_LLM_PROVIDER"]),
    ));
    lines.push(render_line(
        "llm.api_key",
        &redact_secret(config.llm.api_key.as_ref().map(|key| key.expose_secret())),
        source("llm.api_key", &["CARDLINE_LLM_API_KEY", "OPENAI_API_KEY"]),
    ));
    lines.push(render_line(
        "llm.base_url",
        &config.llm.effective_base_url(),
        source("llm.base_url", &["CARDLINE_LLM_BASE_URL"]),
    ));
    lines.push(render_line(
        "llm.analysis_model",
        &config.llm.analysis_model,
        source("llm.analysis_model", &["CARDLINE_LLM_ANALYSIS_MODEL"]),
    ));
    lines.push(render_line(
        "llm.agent_model",
        &config.llm.agent_model,
        source("llm.agent_model", &["CARDLINE_LLM_AGENT_MODEL"]),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        source("llm.timeout_secs", &["CARDLINE_LLM_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["CARDLINE_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["CARDLINE_SERVER_PORT"]),
    ));
    lines.push(render_line(
        "server.cors_allowed_origins",
        &config.server.cors_allowed_origins.join(","),
        source("server.cors_allowed_origins", &["CARDLINE_SERVER_CORS_ALLOWED_ORIGINS"]),
    ));

    lines.push(render_line(
        "agent.off_topic_escalation_threshold",
        &config.agent.off_topic_escalation_threshold.to_string(),
        source(
            "agent.off_topic_escalation_threshold",
            &["CARDLINE_AGENT_OFF_TOPIC_ESCALATION_THRESHOLD"],
        ),
    ));
    lines.push(render_line(
        "agent.conversation_tail",
        &config.agent.conversation_tail.to_string(),
        source("agent.conversation_tail", &["CARDLINE_AGENT_CONVERSATION_TAIL"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["CARDLINE_LOGGING_LEVEL", "CARDLINE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["CARDLINE_LOGGING_FORMAT", "CARDLINE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("cardline.toml"), PathBuf::from("config/cardline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&str>) -> String {
    let Some(trimmed) = secret.map(str::trim) else {
        return "<unset>".to_string();
    };
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use cardline_core::config::AppConfig;

    use super::{redact_secret, render};

    #[test]
    fn api_keys_are_redacted_to_their_prefix() {
        assert_eq!(redact_secret(Some("sk-live-abcdef")), "sk-***");
        assert_eq!(redact_secret(Some("plainsecret")), "<redacted>");
        assert_eq!(redact_secret(Some("   ")), "<empty>");
        assert_eq!(redact_secret(None), "<unset>");
    }

    #[test]
    fn rendered_config_never_contains_the_secret() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-very-secret-value".to_string().into());

        let rendered = render(&config, None);
        assert!(rendered.contains("- llm.api_key = sk-*** (source:"));
        assert!(!rendered.contains("very-secret-value"));
        assert!(rendered.contains("- agent.off_topic_escalation_threshold = 3"));
    }
}
