use std::sync::Arc;

use async_trait::async_trait;
use haggle_core::config::ReplyMatching;
use haggle_core::{NegotiationOracle, Sentiment};

use crate::classifier::Classifier;
use crate::guardrails::ReplyGuard;
use crate::llm::LlmClient;
use crate::sentiment::SentimentAnalyzer;
use crate::validator::ReasonValidator;

/// [`NegotiationOracle`] backed by an LLM classifier.
pub struct ClassifierOracle {
    validator: ReasonValidator,
    sentiment: SentimentAnalyzer,
    provider: &'static str,
}

impl ClassifierOracle {
    pub fn new(client: Arc<dyn LlmClient>, matching: ReplyMatching) -> Self {
        let classifier = Classifier::new(client);
        let guard = ReplyGuard::new(matching);
        Self {
            provider: classifier.provider_name(),
            validator: ReasonValidator::new(classifier.clone(), guard),
            sentiment: SentimentAnalyzer::new(classifier, guard),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider
    }
}

#[async_trait]
impl NegotiationOracle for ClassifierOracle {
    async fn is_valid_reason(&self, reason: &str, prior_reasons: &str) -> bool {
        self.validator.is_valid(reason, prior_reasons).await
    }

    async fn explain_rejection(&self, reason: &str) -> Option<String> {
        self.validator.explain_rejection(reason).await
    }

    async fn classify_sentiment(&self, reason: &str) -> Sentiment {
        self.sentiment.classify(reason).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use haggle_core::config::ReplyMatching;
    use haggle_core::{NegotiationPolicy, NegotiationSession, ProposalOutcome, ProposeRequest, StartRequest};

    use super::ClassifierOracle;
    use crate::llm::OfflineClient;
    use crate::test_support::ScriptedClient;

    fn session(retail_price: f64, max_discount: f64) -> NegotiationSession {
        NegotiationSession::start(
            StartRequest {
                product_name: Some("Office Chair".to_string()),
                product_pricing: Some(150.0),
                max_discount: Some(max_discount),
                retail_price: Some(retail_price),
            },
            NegotiationPolicy::default(),
        )
        .map(|(session, _)| session)
        .expect("start should succeed")
    }

    #[tokio::test]
    async fn end_to_end_valid_reason_applies_the_base_discount() {
        let client = ScriptedClient::replying(vec![Ok("valid"), Ok("neutral")]);
        let oracle = ClassifierOracle::new(client.clone(), ReplyMatching::Strict);
        let mut session = session(200.0, 10.0);

        let outcome = session
            .propose(
                ProposeRequest { reason: Some("defective item".to_string()), counter_offer: None },
                &oracle,
            )
            .await
            .expect("propose should succeed");

        match outcome {
            ProposalOutcome::DiscountApplied(applied) => {
                assert!((applied.discount_applied - 20.0).abs() < 1e-9);
                assert!((applied.final_price - 180.0).abs() < 1e-9);
            }
            other => panic!("expected discount, got {other:?}"),
        }
        assert_eq!(session.validated_reasons(), ["defective item".to_string()]);
        assert_eq!(client.prompts()[0].1.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn offline_classifier_rejects_every_reason() {
        let oracle = ClassifierOracle::new(Arc::new(OfflineClient), ReplyMatching::Strict);
        let mut session = session(100.0, 20.0);

        let outcome = session
            .propose(
                ProposeRequest { reason: Some("it is scratched".to_string()), counter_offer: None },
                &oracle,
            )
            .await
            .expect("propose should succeed");

        match outcome {
            ProposalOutcome::ReasonRejected(rejection) => {
                assert_eq!(rejection.explanation, None);
                assert!((rejection.final_price - 100.0).abs() < 1e-9);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(oracle.provider_name(), "offline");
    }
}
