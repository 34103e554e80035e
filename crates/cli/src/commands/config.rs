use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use haggle_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One reported field: dotted key, rendered value, env vars that can set it (first wins).
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source =
            field_source(&field, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = match &config.llm.api_key {
        Some(secret) => redact_key(secret.expose_secret()),
        None => "<unset>".to_string(),
    };

    vec![
        Field {
            key: "llm.provider",
            value: format!("{:?}", config.llm.provider),
            env_keys: &["HAGGLE_LLM_PROVIDER"],
        },
        Field { key: "llm.api_key", value: api_key, env_keys: &["HAGGLE_LLM_API_KEY", "GEMINI_API_KEY"] },
        Field {
            key: "llm.base_url",
            value: config.llm.base_url.clone(),
            env_keys: &["HAGGLE_LLM_BASE_URL"],
        },
        Field { key: "llm.model", value: config.llm.model.clone(), env_keys: &["HAGGLE_LLM_MODEL"] },
        Field {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_keys: &["HAGGLE_LLM_TIMEOUT_SECS"],
        },
        Field {
            key: "llm.reply_matching",
            value: format!("{:?}", config.llm.reply_matching),
            env_keys: &["HAGGLE_LLM_REPLY_MATCHING"],
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["HAGGLE_SERVER_BIND_ADDRESS"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["HAGGLE_SERVER_PORT", "PORT"],
        },
        Field {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["HAGGLE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Field {
            key: "server.session_ttl_secs",
            value: config.server.session_ttl_secs.to_string(),
            env_keys: &["HAGGLE_SERVER_SESSION_TTL_SECS"],
        },
        Field {
            key: "server.max_sessions",
            value: config.server.max_sessions.to_string(),
            env_keys: &["HAGGLE_SERVER_MAX_SESSIONS"],
        },
        Field {
            key: "negotiation.bonus_rate_pct",
            value: config.negotiation.bonus_rate_pct.to_string(),
            env_keys: &["HAGGLE_NEGOTIATION_BONUS_RATE_PCT"],
        },
        Field {
            key: "negotiation.repeat_bonus_threshold",
            value: config.negotiation.repeat_bonus_threshold.to_string(),
            env_keys: &["HAGGLE_NEGOTIATION_REPEAT_BONUS_THRESHOLD"],
        },
        Field {
            key: "negotiation.counter_offer_rule",
            value: format!("{:?}", config.negotiation.counter_offer_rule),
            env_keys: &["HAGGLE_NEGOTIATION_COUNTER_OFFER_RULE"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["HAGGLE_LOGGING_LEVEL", "HAGGLE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["HAGGLE_LOGGING_FORMAT", "HAGGLE_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("haggle.toml"), PathBuf::from("config/haggle.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &Field,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_by_env = field
        .env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = set_by_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key) {
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

/// Keeps the first four characters so operators can tell keys apart.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    if trimmed.chars().count() <= 8 {
        return "<redacted>".to_string();
    }

    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}***")
}
