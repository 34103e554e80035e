use haggle_agent::{client_from_config, ClassifierOracle};
use haggle_core::config::{AppConfig, LoadOptions};
use haggle_core::{NegotiationOracle, Sentiment};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CLASSIFIER, EXIT_CONFIG};

const COMMAND: &str = "judge";

#[derive(Debug, Serialize)]
struct Judgement {
    reason: String,
    valid: bool,
    sentiment: Sentiment,
    explanation: Option<String>,
    provider: &'static str,
}

/// Judges `reason` the way a proposal would, with `prior` as the reasons given before it.
/// Nothing is stored and no ceiling moves.
pub fn run(reason: &str, prior: &[String]) -> CommandResult {
    let reason = reason.trim();
    if reason.is_empty() {
        return CommandResult::failure(COMMAND, "invalid_input", "reason must not be empty", EXIT_CONFIG);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };
    let client = match client_from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(COMMAND, "classifier_init", error.to_string(), EXIT_CLASSIFIER)
        }
    };
    let oracle = ClassifierOracle::new(client, config.llm.reply_matching);
    let context = match serde_json::to_string(prior) {
        Ok(context) => context,
        Err(error) => {
            return CommandResult::failure(COMMAND, "serialization", error.to_string(), EXIT_CONFIG)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_CLASSIFIER,
            )
        }
    };

    let judgement = runtime.block_on(async {
        let valid = oracle.is_valid_reason(reason, &context).await;
        let explanation = if valid { None } else { oracle.explain_rejection(reason).await };
        let sentiment =
            if valid { oracle.classify_sentiment(reason).await } else { Sentiment::Neutral };
        Judgement {
            reason: reason.to_string(),
            valid,
            sentiment,
            explanation,
            provider: oracle.provider_name(),
        }
    });

    let message = if judgement.valid {
        format!("reason judged valid ({} tone)", judgement.sentiment)
    } else {
        "reason judged invalid".to_string()
    };
    CommandResult::success(COMMAND, message, judgement)
}
