use haggle_agent::{client_from_config, Classifier};
use haggle_core::config::{AppConfig, LlmProvider, LoadOptions};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG};

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

const PROBE_PROMPT: &str = "Respond with exactly one word: \"ready\".";

pub fn run(json_output: bool, probe: bool) -> CommandResult {
    let report = build_report(probe);
    let exit_code = if report.overall_status == CheckStatus::Fail { EXIT_CONFIG } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(probe: bool) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_classifier_provider(&config));
            checks.push(if probe {
                probe_classifier(&config)
            } else {
                skipped("classifier_probe", "pass --probe to send a live classification request")
            });
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("classifier_provider", "skipped because configuration did not load"));
            checks.push(skipped("classifier_probe", "skipped because configuration did not load"));
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let (overall_status, summary) = if failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed".to_string())
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed".to_string())
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_classifier_provider(config: &AppConfig) -> DoctorCheck {
    match config.llm.provider {
        LlmProvider::Gemini => DoctorCheck {
            name: "classifier_provider",
            status: CheckStatus::Pass,
            details: format!("gemini model `{}` with api key configured", config.llm.model),
        },
        LlmProvider::Offline => skipped(
            "classifier_provider",
            "offline provider: every reason will be judged invalid and every tone neutral",
        ),
    }
}

fn probe_classifier(config: &AppConfig) -> DoctorCheck {
    if config.llm.provider == LlmProvider::Offline {
        return skipped("classifier_probe", "offline provider has nothing to probe");
    }

    let client = match client_from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "classifier_probe",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "classifier_probe",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let classifier = Classifier::new(client);
    match runtime.block_on(classifier.classify("doctor_probe", PROBE_PROMPT, None)) {
        Ok(reply) => DoctorCheck {
            name: "classifier_probe",
            status: CheckStatus::Pass,
            details: format!("provider replied `{reply}`"),
        },
        Err(error) => DoctorCheck {
            name: "classifier_probe",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

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

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
