use cardline_core::config::{AppConfig, LlmProvider, LoadOptions};
use cardline_core::Catalog;
use serde::Serialize;

use super::escape_json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report(AppConfig::load(LoadOptions::default()).map_err(|e| e.to_string()));

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(config: Result<AppConfig, String>) -> DoctorReport {
    let mut checks = Vec::new();

    match config {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_completion_credentials(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error,
            });
            checks.push(DoctorCheck {
                name: "completion_credentials",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }
    checks.push(check_sample_data());

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_completion_credentials(config: &AppConfig) -> DoctorCheck {
    let base_url = config.llm.effective_base_url();
    match (config.llm.provider, config.llm.has_credentials()) {
        (LlmProvider::Ollama, _) => DoctorCheck {
            name: "completion_credentials",
            status: CheckStatus::Pass,
            details: format!("ollama at `{base_url}` needs no credential"),
        },
        (LlmProvider::OpenAi, true) => DoctorCheck {
            name: "completion_credentials",
            status: CheckStatus::Pass,
            details: format!("api key present for `{base_url}`"),
        },
        (LlmProvider::OpenAi, false) => DoctorCheck {
            name: "completion_credentials",
            status: CheckStatus::Fail,
            details: "no api key; set CARDLINE_LLM_API_KEY or OPENAI_API_KEY".to_string(),
        },
    }
}

fn check_sample_data() -> DoctorCheck {
    match Catalog::load_embedded() {
        Ok(catalog) => DoctorCheck {
            name: "sample_data",
            status: CheckStatus::Pass,
            details: format!(
                "{} fraud scenarios, {} merchants, {} customers, {} disputes",
                catalog.fraud_scenarios().len(),
                catalog.merchant_summaries().len(),
                catalog.customer_summaries().len(),
                catalog.dispute_summaries().len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "sample_data",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
