//! Classifier agent - LLM-backed judgements for the negotiation core
//!
//! This crate turns an external text-completion service into the three judgements a
//! negotiation needs:
//! - Is a stated reason good enough for a discount? (`validator`)
//! - Why was it not? (`validator::ReasonValidator::explain_rejection`)
//! - What tone was it written in? (`sentiment`)
//!
//! # Architecture
//!
//! 1. **Transport** (`llm`, `gemini`) - `LlmClient` sends a prompt and returns the raw
//!    reply or a typed `ClassifierError`
//! 2. **Adapter** (`classifier`) - trims replies, logs failures
//! 3. **Guardrails** (`guardrails`) - maps free text onto a fixed label set
//! 4. **Oracle** (`oracle`) - implements `haggle_core::NegotiationOracle`
//!
//! # Safety Principle
//!
//! The LLM is strictly a classifier. It NEVER decides prices or discount amounts.
//! Its replies are untrusted: anything outside the expected labels, and any
//! transport failure, degrades to "invalid" / "neutral".

pub mod classifier;
pub mod gemini;
pub mod guardrails;
pub mod llm;
pub mod oracle;
pub mod sentiment;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use classifier::Classifier;
pub use gemini::GeminiClient;
pub use llm::{client_from_config, ClassifierError, ClientInitError, LlmClient, OfflineClient};
pub use oracle::ClassifierOracle;
