use std::env;
use std::sync::{Mutex, OnceLock};

use cardline_cli::commands::{classify, config, doctor};
use serde_json::Value;

#[test]
fn classify_reports_sentiment_intent_and_actions() {
    let result = classify::run("I lost my card and I'm so frustrated");
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "classify");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["sentiment"], "frustrated");
    assert_eq!(payload["intent"], "lost_card");
    assert_eq!(payload["off_topic"], false);
    assert_eq!(payload["suggested_actions"][0], "Freeze card immediately");
}

#[test]
fn classify_flags_off_topic_messages() {
    let payload = parse_payload(&classify::run("tell me a joke").output);
    assert_eq!(payload["off_topic"], true);
    assert_eq!(payload["intent"], "general_inquiry");
}

#[test]
fn classify_rejects_blank_messages() {
    let result = classify::run("   ");
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "validation");
}

#[test]
fn doctor_passes_with_api_key() {
    with_env(&[("CARDLINE_LLM_API_KEY", "sk-test")], || {
        let payload = parse_payload(&doctor::run(true));
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "completion_credentials");
    });
}

#[test]
fn doctor_fails_credential_check_without_key() {
    with_env(&[], || {
        let payload = parse_payload(&doctor::run(true));
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "pass");
        assert_eq!(payload["checks"][1]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "pass");
    });
}

#[test]
fn doctor_reports_invalid_config() {
    with_env(&[("CARDLINE_LLM_TIMEOUT_SECS", "0")], || {
        let output = doctor::run(false);
        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] config_validation:"));
        assert!(output.contains("- [skip] completion_credentials:"));
    });
}

#[test]
fn config_attributes_env_sources_and_redacts_key() {
    with_env(&[("OPENAI_API_KEY", "sk-abc123"), ("CARDLINE_SERVER_PORT", "9001")], || {
        let output = config::run();
        assert!(output.contains("- llm.api_key = sk-*** (source: env (OPENAI_API_KEY))"));
        assert!(output.contains("- server.port = 9001 (source: env (CARDLINE_SERVER_PORT))"));
        assert!(output.contains("- llm.analysis_model = gpt-3.5-turbo (source: default)"));
        assert!(!output.contains("abc123"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPENAI_API_KEY",
        "CARDLINE_LLM_PROVIDER",
        "CARDLINE_LLM_API_KEY",
        "CARDLINE_LLM_BASE_URL",
        "CARDLINE_LLM_ANALYSIS_MODEL",
        "CARDLINE_LLM_AGENT_MODEL",
        "CARDLINE_LLM_TIMEOUT_SECS",
        "CARDLINE_SERVER_BIND_ADDRESS",
        "CARDLINE_SERVER_PORT",
        "CARDLINE_SERVER_CORS_ALLOWED_ORIGINS",
        "CARDLINE_AGENT_OFF_TOPIC_ESCALATION_THRESHOLD",
        "CARDLINE_AGENT_CONVERSATION_TAIL",
        "CARDLINE_LOGGING_LEVEL",
        "CARDLINE_LOGGING_FORMAT",
        "CARDLINE_LOG_LEVEL",
        "CARDLINE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
