use serde::{Deserialize, Serialize};

use crate::negotiation::DiscountCeiling;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterOfferRule {
    /// Accept any offer between the current floor and the retail price, inclusive.
    WithinRange,
    /// `offer < floor && offer >= retail - max_discount`. Both bounds are the same
    /// number, so no offer is ever accepted.
    Literal,
}

impl CounterOfferRule {
    pub fn accepts(self, offer: f64, ceiling: &DiscountCeiling) -> bool {
        let floor = ceiling.discounted_price_floor();
        match self {
            Self::WithinRange => offer >= floor && offer <= ceiling.retail_price(),
            Self::Literal => {
                offer < floor && offer >= ceiling.retail_price() - ceiling.max_discount_amount()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationPolicy {
    /// Fraction of the current ceiling added per bonus.
    pub bonus_rate: f64,
    /// Repeat bonus applies once more than this many reasons were validated before.
    pub repeat_bonus_threshold: usize,
    pub counter_offer_rule: CounterOfferRule,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            bonus_rate: 0.05,
            repeat_bonus_threshold: 1,
            counter_offer_rule: CounterOfferRule::WithinRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CounterOfferRule;
    use crate::negotiation::DiscountCeiling;

    #[test]
    fn within_range_accepts_floor_through_retail() {
        let ceiling = DiscountCeiling::new(100.0, 20.0);
        let rule = CounterOfferRule::WithinRange;

        assert!(rule.accepts(80.0, &ceiling));
        assert!(rule.accepts(92.5, &ceiling));
        assert!(rule.accepts(100.0, &ceiling));
        assert!(!rule.accepts(79.99, &ceiling));
        assert!(!rule.accepts(100.01, &ceiling));
    }

    #[test]
    fn literal_bounds_collapse_and_reject_every_offer() {
        let mut ceiling = DiscountCeiling::new(100.0, 20.0);
        ceiling.apply_bonus(0.05);
        let floor = ceiling.discounted_price_floor();
        let rule = CounterOfferRule::Literal;

        assert!(!rule.accepts(floor, &ceiling));
        assert!(!rule.accepts(floor - 0.01, &ceiling));
        assert!(!rule.accepts(floor + 0.01, &ceiling));
    }
}
