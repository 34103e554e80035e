use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::DomainError;
use crate::negotiation::{DiscountCeiling, NegotiationOracle, NegotiationPolicy, Sentiment};

pub const MISSING_START_FIELDS: &str =
    "Please provide product name, product pricing, max discount, and retail price.";
pub const MISSING_REASON: &str = "Please provide a valid reason for requesting a discount.";
const REASON_REJECTED: &str = "The reason provided is not valid, so no discount can be applied.";
const COUNTER_OFFER_REJECTED: &str =
    "Counteroffer exceeds the maximum allowable discount. The price remains the same.";
const DISCOUNT_APPLIED: &str = "Thank you for your valid reason. A discount has been applied.";
const OFFER_ACCEPTED: &str = "Offer accepted. Thank you for your purchase!";
const OFFER_REJECTED: &str = "Offer rejected. No discount will be applied.";

/// Body of a start request. Every field is required; `max_discount` is a percentage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub product_name: Option<String>,
    pub product_pricing: Option<f64>,
    pub max_discount: Option<f64>,
    pub retail_price: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeRequest {
    pub reason: Option<String>,
    pub counter_offer: Option<f64>,
}

impl ProposeRequest {
    /// Checks the body without touching any session and returns the reason as submitted.
    pub fn validate(&self) -> Result<&str, DomainError> {
        let reason = self
            .reason
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
            .ok_or_else(|| DomainError::InvalidInput(MISSING_REASON.to_string()))?;
        if let Some(counter_offer) = self.counter_offer {
            if !counter_offer.is_finite() {
                return Err(DomainError::InvalidInput(
                    "counterOffer must be a finite number".to_string(),
                ));
            }
        }
        Ok(reason)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub message: String,
    /// Discount ceiling as an amount, not a percentage.
    pub max_discount: f64,
    pub discounted_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRejection {
    pub message: String,
    pub rejected: bool,
    pub explanation: Option<String>,
    pub final_price: f64,
    pub all_reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterOfferRejection {
    pub message: String,
    pub rejected: bool,
    pub final_price: f64,
    pub all_reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountApplied {
    pub message: String,
    pub original_price: f64,
    pub retail_price: f64,
    pub discount_applied: f64,
    pub final_price: f64,
    pub sentiment: Sentiment,
    pub all_reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProposalOutcome {
    ReasonRejected(ReasonRejection),
    CounterOfferRejected(CounterOfferRejection),
    DiscountApplied(DiscountApplied),
}

impl ProposalOutcome {
    pub fn final_price(&self) -> f64 {
        match self {
            Self::ReasonRejected(outcome) => outcome.final_price,
            Self::CounterOfferRejected(outcome) => outcome.final_price,
            Self::DiscountApplied(outcome) => outcome.final_price,
        }
    }

    pub fn all_reasons(&self) -> &[String] {
        match self {
            Self::ReasonRejected(outcome) => &outcome.all_reasons,
            Self::CounterOfferRejected(outcome) => &outcome.all_reasons,
            Self::DiscountApplied(outcome) => &outcome.all_reasons,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReasonRejected(_) => "reason_rejected",
            Self::CounterOfferRejected(_) => "counter_offer_rejected",
            Self::DiscountApplied(_) => "discount_applied",
        }
    }
}

/// Terminal view returned by accept and reject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDecision {
    pub message: String,
    pub final_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub product_name: String,
    pub original_price: f64,
    pub retail_price: f64,
    pub max_discount_amount: f64,
    pub discounted_price_floor: f64,
    pub all_reasons: Vec<String>,
    pub validated_reasons: Vec<String>,
    pub offer_count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NegotiationSession {
    product_name: String,
    original_price: f64,
    ceiling: DiscountCeiling,
    all_reasons: Vec<String>,
    validated_reasons: Vec<String>,
    offer_count: u32,
    policy: NegotiationPolicy,
}

impl NegotiationSession {
    pub fn start(
        request: StartRequest,
        policy: NegotiationPolicy,
    ) -> Result<(Self, SessionSummary), DomainError> {
        let product_name = request
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DomainError::InvalidInput(MISSING_START_FIELDS.to_string()))?
            .to_string();
        let (Some(original_price), Some(max_discount_pct), Some(retail_price)) =
            (request.product_pricing, request.max_discount, request.retail_price)
        else {
            return Err(DomainError::InvalidInput(MISSING_START_FIELDS.to_string()));
        };

        if !original_price.is_finite() || original_price <= 0.0 {
            return Err(DomainError::InvalidInput(
                "productPricing must be a positive number".to_string(),
            ));
        }
        if !retail_price.is_finite() || retail_price <= 0.0 {
            return Err(DomainError::InvalidInput(
                "retailPrice must be a positive number".to_string(),
            ));
        }
        if !max_discount_pct.is_finite() || !(0.0..=100.0).contains(&max_discount_pct) {
            return Err(DomainError::InvalidInput(
                "maxDiscount must be a percentage between 0 and 100".to_string(),
            ));
        }

        let session = Self {
            product_name,
            original_price,
            ceiling: DiscountCeiling::new(retail_price, max_discount_pct),
            all_reasons: Vec::new(),
            validated_reasons: Vec::new(),
            offer_count: 0,
            policy,
        };

        let summary = SessionSummary {
            message: format!(
                "The current price of {} is ${}. Please provide a valid reason for requesting a discount.",
                session.product_name, retail_price
            ),
            max_discount: session.ceiling.max_discount_amount(),
            discounted_price: session.ceiling.discounted_price_floor(),
        };

        Ok((session, summary))
    }

    pub async fn propose<O>(
        &mut self,
        request: ProposeRequest,
        oracle: &O,
    ) -> Result<ProposalOutcome, DomainError>
    where
        O: NegotiationOracle + ?Sized,
    {
        let reason = request.validate()?.to_string();

        if !self.is_validated(&reason) {
            let context = self.reasons_context();
            if !oracle.is_valid_reason(&reason, &context).await {
                self.all_reasons.push(reason.clone());
                let explanation = oracle.explain_rejection(&reason).await;
                info!(
                    event_name = "negotiation.reason.rejected",
                    product = %self.product_name,
                    reason_count = self.all_reasons.len(),
                    "reason judged invalid, ceiling unchanged"
                );
                return Ok(ProposalOutcome::ReasonRejected(ReasonRejection {
                    message: REASON_REJECTED.to_string(),
                    rejected: true,
                    explanation,
                    final_price: self.ceiling.retail_price(),
                    all_reasons: self.all_reasons.clone(),
                }));
            }
            self.validated_reasons.push(reason.clone());
        }

        self.all_reasons.push(reason.clone());
        let sentiment = oracle.classify_sentiment(&reason).await;

        let previous_valid_count = self.validated_reasons.len().saturating_sub(1);
        if previous_valid_count > self.policy.repeat_bonus_threshold {
            let added = self.ceiling.apply_bonus(self.policy.bonus_rate);
            debug!(
                event_name = "negotiation.bonus.repeat",
                previous_valid_count,
                added,
                max_discount = self.ceiling.max_discount_amount(),
                "repeat valid reason bonus applied"
            );
        }
        if sentiment == Sentiment::Polite {
            let added = self.ceiling.apply_bonus(self.policy.bonus_rate);
            debug!(
                event_name = "negotiation.bonus.politeness",
                added,
                max_discount = self.ceiling.max_discount_amount(),
                "politeness bonus applied"
            );
        }

        let (final_price, message) = match request.counter_offer {
            Some(counter_offer) => {
                if !self.policy.counter_offer_rule.accepts(counter_offer, &self.ceiling) {
                    info!(
                        event_name = "negotiation.counter_offer.rejected",
                        counter_offer,
                        floor = self.ceiling.discounted_price_floor(),
                        "counter offer outside the acceptable range"
                    );
                    return Ok(ProposalOutcome::CounterOfferRejected(CounterOfferRejection {
                        message: COUNTER_OFFER_REJECTED.to_string(),
                        rejected: true,
                        final_price: self.ceiling.retail_price(),
                        all_reasons: self.all_reasons.clone(),
                    }));
                }
                self.offer_count += 1;
                info!(
                    event_name = "negotiation.counter_offer.accepted",
                    counter_offer,
                    offer_count = self.offer_count,
                    "counter offer accepted"
                );
                (counter_offer, format!("Your counteroffer of ${counter_offer} is accepted."))
            }
            None => (self.ceiling.discounted_price_floor(), DISCOUNT_APPLIED.to_string()),
        };

        Ok(ProposalOutcome::DiscountApplied(DiscountApplied {
            message,
            original_price: self.original_price,
            retail_price: self.ceiling.retail_price(),
            discount_applied: self.ceiling.max_discount_amount(),
            final_price,
            sentiment,
            all_reasons: self.all_reasons.clone(),
        }))
    }

    pub fn accept(&self) -> OfferDecision {
        OfferDecision {
            message: OFFER_ACCEPTED.to_string(),
            final_price: self.ceiling.discounted_price_floor(),
        }
    }

    pub fn reject(&self) -> OfferDecision {
        OfferDecision { message: OFFER_REJECTED.to_string(), final_price: self.ceiling.retail_price() }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            product_name: self.product_name.clone(),
            original_price: self.original_price,
            retail_price: self.ceiling.retail_price(),
            max_discount_amount: self.ceiling.max_discount_amount(),
            discounted_price_floor: self.ceiling.discounted_price_floor(),
            all_reasons: self.all_reasons.clone(),
            validated_reasons: self.validated_reasons.clone(),
            offer_count: self.offer_count,
        }
    }

    pub fn ceiling(&self) -> &DiscountCeiling {
        &self.ceiling
    }

    pub fn all_reasons(&self) -> &[String] {
        &self.all_reasons
    }

    pub fn validated_reasons(&self) -> &[String] {
        &self.validated_reasons
    }

    pub fn offer_count(&self) -> u32 {
        self.offer_count
    }

    /// Reasons are stored as submitted; surrounding whitespace is ignored when matching.
    fn is_validated(&self, reason: &str) -> bool {
        let reason = reason.trim();
        self.validated_reasons.iter().any(|validated| validated.trim() == reason)
    }

    fn reasons_context(&self) -> String {
        serde_json::to_string(&self.all_reasons).unwrap_or_else(|_| "[]".to_string())
    }
}
