//! Core of the haggle negotiation service: configuration, the error taxonomy and the
//! negotiation state machine. Nothing in this crate talks to the network.

pub mod config;
pub mod errors;
pub mod negotiation;

pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use negotiation::{
    CounterOfferRule, DiscountCeiling, NegotiationOracle, NegotiationPolicy, NegotiationSession,
    OfferDecision, ProposalOutcome, ProposeRequest, Sentiment, SessionId, SessionSnapshot,
    SessionSummary, StartRequest,
};
