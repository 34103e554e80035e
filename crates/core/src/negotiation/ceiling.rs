/// Discount ceiling of a negotiation and the price floor it implies.
///
/// `discounted_price_floor` is always `retail_price - max_discount_amount`; both are
/// only ever changed together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountCeiling {
    retail_price: f64,
    max_discount_amount: f64,
    discounted_price_floor: f64,
}

impl DiscountCeiling {
    pub fn new(retail_price: f64, max_discount_pct: f64) -> Self {
        let mut ceiling = Self {
            retail_price,
            max_discount_amount: retail_price * (max_discount_pct / 100.0),
            discounted_price_floor: retail_price,
        };
        ceiling.set_max_discount(ceiling.max_discount_amount);
        ceiling
    }

    pub fn retail_price(&self) -> f64 {
        self.retail_price
    }

    pub fn max_discount_amount(&self) -> f64 {
        self.max_discount_amount
    }

    pub fn discounted_price_floor(&self) -> f64 {
        self.discounted_price_floor
    }

    /// Grows the ceiling by `rate` of its current value and returns the amount added.
    ///
    /// The ceiling never exceeds the retail price.
    pub fn apply_bonus(&mut self, rate: f64) -> f64 {
        let before = self.max_discount_amount;
        self.set_max_discount(before + before * rate);
        self.max_discount_amount - before
    }

    fn set_max_discount(&mut self, amount: f64) {
        self.max_discount_amount = amount.clamp(0.0, self.retail_price);
        self.discounted_price_floor = self.retail_price - self.max_discount_amount;
    }
}

#[cfg(test)]
mod tests {
    use super::DiscountCeiling;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn initial_ceiling_is_percentage_of_retail() {
        let ceiling = DiscountCeiling::new(100.0, 20.0);

        assert!(approx(ceiling.max_discount_amount(), 20.0));
        assert!(approx(ceiling.discounted_price_floor(), 80.0));
    }

    #[test]
    fn bonuses_compound_on_the_current_ceiling() {
        let mut ceiling = DiscountCeiling::new(200.0, 10.0);

        let first = ceiling.apply_bonus(0.05);
        let second = ceiling.apply_bonus(0.05);

        assert!(approx(first, 1.0));
        assert!(approx(second, 1.05));
        assert!(approx(ceiling.max_discount_amount(), 20.0 * 1.05 * 1.05));
        assert!(approx(
            ceiling.discounted_price_floor(),
            200.0 - ceiling.max_discount_amount()
        ));
    }

    #[test]
    fn ceiling_is_clamped_at_retail_price() {
        let mut ceiling = DiscountCeiling::new(50.0, 98.0);

        for _ in 0..10 {
            ceiling.apply_bonus(0.05);
        }

        assert!(approx(ceiling.max_discount_amount(), 50.0));
        assert!(approx(ceiling.discounted_price_floor(), 0.0));
        assert!(approx(ceiling.apply_bonus(0.05), 0.0));
    }

    #[test]
    fn zero_percent_ceiling_stays_zero() {
        let mut ceiling = DiscountCeiling::new(80.0, 0.0);
        ceiling.apply_bonus(0.05);

        assert!(approx(ceiling.max_discount_amount(), 0.0));
        assert!(approx(ceiling.discounted_price_floor(), 80.0));
    }
}
