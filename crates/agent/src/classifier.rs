use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{ClassifierError, LlmClient};

/// Single call contract to the text-completion service.
#[derive(Clone)]
pub struct Classifier {
    client: Arc<dyn LlmClient>,
}

impl Classifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Returns the trimmed reply. Failures are logged here and returned to the caller,
    /// which picks its own fallback.
    pub async fn classify(
        &self,
        purpose: &'static str,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<String, ClassifierError> {
        let reply = self.client.complete(prompt, context).await.and_then(|reply| {
            let trimmed = reply.trim();
            if trimmed.is_empty() {
                Err(ClassifierError::EmptyReply)
            } else {
                Ok(trimmed.to_string())
            }
        });

        match &reply {
            Ok(text) => debug!(
                event_name = "classifier.call.completed",
                provider = self.client.provider_name(),
                purpose,
                reply = %text,
                "classifier replied"
            ),
            Err(error) => warn!(
                event_name = "classifier.call.failed",
                provider = self.client.provider_name(),
                purpose,
                error = %error,
                "classifier unavailable, falling back"
            ),
        }

        reply
    }
}
