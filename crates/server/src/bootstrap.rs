use std::sync::Arc;

use haggle_agent::{client_from_config, ClassifierOracle, ClientInitError};
use haggle_core::config::AppConfig;
use thiserror::Error;
use tracing::info;

use crate::routes::NegotiationState;
use crate::sessions::{SessionLimits, SessionRegistry};

pub struct Application {
    pub config: AppConfig,
    pub registry: SessionRegistry,
    pub negotiation: NegotiationState,
    pub classifier_provider: &'static str,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("classifier client could not be created: {0}")]
    ClassifierClient(#[from] ClientInitError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = client_from_config(&config.llm)?;
    let oracle = ClassifierOracle::new(client, config.llm.reply_matching);
    let classifier_provider = oracle.provider_name();
    info!(
        event_name = "system.bootstrap.classifier_ready",
        correlation_id = "bootstrap",
        provider = classifier_provider,
        model = %config.llm.model,
        reply_matching = ?config.llm.reply_matching,
        "classifier client initialized"
    );

    let registry = SessionRegistry::new(SessionLimits::from_config(&config.server));
    let negotiation =
        NegotiationState::new(registry.clone(), Arc::new(oracle), config.negotiation_policy());

    Ok(Application { config, registry, negotiation, classifier_provider })
}
