use crate::classifier::Classifier;
use crate::guardrails::{ReasonVerdict, ReplyGuard};

pub struct ReasonValidator {
    classifier: Classifier,
    guard: ReplyGuard,
}

impl ReasonValidator {
    pub fn new(classifier: Classifier, guard: ReplyGuard) -> Self {
        Self { classifier, guard }
    }

    /// `prior_reasons` is sent as situational context next to the prompt.
    /// An unavailable classifier counts as "invalid".
    pub async fn is_valid(&self, reason: &str, prior_reasons: &str) -> bool {
        match self.classifier.classify("reason_validity", &validity_prompt(reason), Some(prior_reasons)).await {
            Ok(reply) => self.guard.reason_verdict(&reply) == ReasonVerdict::Valid,
            Err(_) => false,
        }
    }

    pub async fn explain_rejection(&self, reason: &str) -> Option<String> {
        self.classifier.classify("rejection_explanation", &explanation_prompt(reason), None).await.ok()
    }
}

fn validity_prompt(reason: &str) -> String {
    format!(
        "Determine if the following reason is valid for a price drop request: \"{reason}\". \
         The reasons the buyer gave earlier in this negotiation follow as context. \
         Respond with exactly one word, either \"valid\" or \"invalid\", and nothing else."
    )
}

fn explanation_prompt(reason: &str) -> String {
    format!("Provide a one line reason why this reason: \"{reason}\" is not enough for a discount.")
}
