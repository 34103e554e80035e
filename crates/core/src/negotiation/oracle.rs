use async_trait::async_trait;

use crate::negotiation::Sentiment;

/// Judgements a negotiation needs from an external classifier.
///
/// Implementations must not fail: an unavailable classifier answers "invalid",
/// `None` and [`Sentiment::Neutral`] respectively.
#[async_trait]
pub trait NegotiationOracle: Send + Sync {
    /// `prior_reasons` is the JSON array of every reason submitted so far.
    async fn is_valid_reason(&self, reason: &str, prior_reasons: &str) -> bool;

    async fn explain_rejection(&self, reason: &str) -> Option<String>;

    async fn classify_sentiment(&self, reason: &str) -> Sentiment;
}
