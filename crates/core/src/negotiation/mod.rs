//! Price negotiation state machine.
//!
//! A [`NegotiationSession`] holds the pricing terms of one negotiation, the reasons
//! a buyer has offered so far and the current discount ceiling. Reason validity and
//! tone are judged by a [`NegotiationOracle`]; the session only decides how those
//! judgements move the ceiling and whether a counter-offer is acceptable.

pub mod ceiling;
pub mod oracle;
pub mod policy;
pub mod session;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use ceiling::DiscountCeiling;
pub use oracle::NegotiationOracle;
pub use policy::{CounterOfferRule, NegotiationPolicy};
pub use session::{
    CounterOfferRejection, DiscountApplied, NegotiationSession, OfferDecision, ProposalOutcome,
    ProposeRequest, ReasonRejection, SessionSnapshot, SessionSummary, StartRequest,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    const DEFAULT: &'static str = "default";

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The session used by clients that never name one.
    pub fn default_session() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Neutral,
    Polite,
    Rude,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Neutral, Sentiment::Polite, Sentiment::Rude];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Polite => "polite",
            Self::Rude => "rude",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
