use haggle_core::config::ReplyMatching;
use haggle_core::Sentiment;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonVerdict {
    Valid,
    Invalid,
}

/// Maps free-text classifier replies onto fixed labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplyGuard {
    matching: ReplyMatching,
}

impl Default for ReplyGuard {
    fn default() -> Self {
        Self { matching: ReplyMatching::Strict }
    }
}

impl ReplyGuard {
    pub fn new(matching: ReplyMatching) -> Self {
        Self { matching }
    }

    pub fn reason_verdict(&self, reply: &str) -> ReasonVerdict {
        match self.matching {
            ReplyMatching::Strict => match normalize_label(reply).as_str() {
                "valid" => ReasonVerdict::Valid,
                _ => ReasonVerdict::Invalid,
            },
            ReplyMatching::Lenient => {
                // Matches "not valid" too.
                let lowered = reply.trim().to_lowercase();
                if lowered != "invalid" && lowered.contains("valid") {
                    ReasonVerdict::Valid
                } else {
                    ReasonVerdict::Invalid
                }
            }
        }
    }

    pub fn sentiment(&self, reply: &str) -> Sentiment {
        match self.matching {
            ReplyMatching::Strict => {
                let label = normalize_label(reply);
                Sentiment::ALL
                    .into_iter()
                    .find(|sentiment| sentiment.as_str() == label)
                    .unwrap_or(Sentiment::Neutral)
            }
            ReplyMatching::Lenient => {
                let lowered = reply.to_lowercase();
                if lowered.contains("polite") {
                    Sentiment::Polite
                } else if lowered.contains("rude") {
                    Sentiment::Rude
                } else {
                    Sentiment::Neutral
                }
            }
        }
    }
}

/// Lower-cases and strips surrounding whitespace, quotes and punctuation.
pub fn normalize_label(reply: &str) -> String {
    reply
        .trim()
        .trim_matches(|ch: char| ch.is_ascii_punctuation() || ch.is_whitespace())
        .to_lowercase()
}
