use cardline_agent::actions::suggested_actions;
use cardline_agent::classify::classify;
use cardline_core::domain::classification::{Intent, Sentiment};
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ClassificationReport<'a> {
    command: &'static str,
    status: &'static str,
    message: &'a str,
    sentiment: Sentiment,
    intent: Intent,
    off_topic: bool,
    suggested_actions: Vec<String>,
}

/// Runs the keyword classifiers without touching config or the completion API.
pub fn run(message: &str) -> CommandResult {
    let message = message.trim();
    if message.is_empty() {
        return CommandResult::failure("classify", "validation", "message is required", 2);
    }

    let classification = classify(message);
    let report = ClassificationReport {
        command: "classify",
        status: "ok",
        message,
        sentiment: classification.sentiment,
        intent: classification.intent,
        off_topic: classification.off_topic,
        suggested_actions: suggested_actions(classification.intent),
    };

    match serde_json::to_string(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("classify", "serialization", error.to_string(), 1),
    }
}
