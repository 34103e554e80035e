use haggle_core::Sentiment;

use crate::classifier::Classifier;
use crate::guardrails::ReplyGuard;

pub struct SentimentAnalyzer {
    classifier: Classifier,
    guard: ReplyGuard,
}

impl SentimentAnalyzer {
    pub fn new(classifier: Classifier, guard: ReplyGuard) -> Self {
        Self { classifier, guard }
    }

    pub async fn classify(&self, reason: &str) -> Sentiment {
        match self.classifier.classify("sentiment", &sentiment_prompt(reason), None).await {
            Ok(reply) => self.guard.sentiment(&reply),
            Err(_) => Sentiment::Neutral,
        }
    }
}

fn sentiment_prompt(reason: &str) -> String {
    format!(
        "Analyze the sentiment of the following text: \"{reason}\". \
         Respond with exactly one word, \"neutral\", \"polite\" or \"rude\", and nothing else."
    )
}

#[cfg(test)]
mod tests {
    use haggle_core::config::ReplyMatching;
    use haggle_core::Sentiment;

    use super::SentimentAnalyzer;
    use crate::classifier::Classifier;
    use crate::guardrails::ReplyGuard;
    use crate::llm::ClassifierError;
    use crate::test_support::ScriptedClient;

    #[tokio::test]
    async fn labels_map_onto_sentiments() {
        let client = ScriptedClient::replying(vec![Ok("Polite"), Ok("rude"), Ok("neutral")]);
        let analyzer = SentimentAnalyzer::new(
            Classifier::new(client.clone()),
            ReplyGuard::new(ReplyMatching::Strict),
        );

        assert_eq!(analyzer.classify("please").await, Sentiment::Polite);
        assert_eq!(analyzer.classify("now!").await, Sentiment::Rude);
        assert_eq!(analyzer.classify("it broke").await, Sentiment::Neutral);
        assert!(client.prompts()[0].0.contains("\"please\""));
    }

    #[tokio::test]
    async fn classifier_failure_defaults_to_neutral() {
        let analyzer = SentimentAnalyzer::new(
            Classifier::new(ScriptedClient::replying(vec![Err::<&str, _>(ClassifierError::Disabled)])),
            ReplyGuard::new(ReplyMatching::Lenient),
        );

        assert_eq!(analyzer.classify("please").await, Sentiment::Neutral);
    }
}
