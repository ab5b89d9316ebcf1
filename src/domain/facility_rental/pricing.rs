//! Discount pricing rules and the suggested-price calculator.
//!
//! A rule reads "renting type A costs `special_price` if the member already
//! rents type B". The calculator indexes active rules by target type once
//! and is read-only afterwards, so it can be shared across requests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{FacilityTypeId, Money, PricingRuleId};

/// A conditional special price for one facility type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: PricingRuleId,
    pub facility_type_id: FacilityTypeId,

    /// Type the member must already rent for the rule to apply.
    pub required_facility_type_id: FacilityTypeId,

    pub special_price: Money,
    pub description: String,
    pub active: bool,
}

/// In-memory index of active pricing rules grouped by facility type.
#[derive(Debug, Clone, Default)]
pub struct SuggestedPriceCalculator {
    rules_by_type: HashMap<FacilityTypeId, Vec<PricingRule>>,
}

impl SuggestedPriceCalculator {
    /// Indexes `rules`, dropping inactive ones. Registration order is kept
    /// within each facility type.
    pub fn new(rules: impl IntoIterator<Item = PricingRule>) -> Self {
        let mut rules_by_type: HashMap<FacilityTypeId, Vec<PricingRule>> = HashMap::new();
        for rule in rules.into_iter().filter(|r| r.active) {
            rules_by_type
                .entry(rule.facility_type_id)
                .or_default()
                .push(rule);
        }
        Self { rules_by_type }
    }

    /// Lowest applicable special price, or `base_price` when no rule applies.
    ///
    /// The winning special price is not compared against `base_price`.
    /// Among equal lowest prices the first registered rule wins.
    pub fn calculate_suggested_price(
        &self,
        facility_type_id: FacilityTypeId,
        base_price: Money,
        member_rented_types: &[FacilityTypeId],
    ) -> Money {
        self.best_rule(facility_type_id, member_rented_types)
            .map(|rule| rule.special_price)
            .unwrap_or(base_price)
    }

    /// The rule `calculate_suggested_price` would apply, if any.
    pub fn best_rule(
        &self,
        facility_type_id: FacilityTypeId,
        member_rented_types: &[FacilityTypeId],
    ) -> Option<&PricingRule> {
        self.applicable(facility_type_id, member_rented_types)
            .fold(None, |best: Option<&PricingRule>, rule| match best {
                Some(current) if current.special_price <= rule.special_price => Some(current),
                _ => Some(rule),
            })
    }

    /// All applicable rules, in registration order.
    pub fn applicable_pricing_rules(
        &self,
        facility_type_id: FacilityTypeId,
        member_rented_types: &[FacilityTypeId],
    ) -> Vec<PricingRule> {
        self.applicable(facility_type_id, member_rented_types)
            .cloned()
            .collect()
    }

    /// Number of active rules indexed.
    pub fn rule_count(&self) -> usize {
        self.rules_by_type.values().map(Vec::len).sum()
    }

    fn applicable<'a, 's: 'a>(
        &'s self,
        facility_type_id: FacilityTypeId,
        member_rented_types: &'a [FacilityTypeId],
    ) -> impl Iterator<Item = &'s PricingRule> + 'a {
        self.rules_by_type
            .get(&facility_type_id)
            .into_iter()
            .flatten()
            .filter(move |rule| member_rented_types.contains(&rule.required_facility_type_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TYPE_A: FacilityTypeId = FacilityTypeId::new(1);
    const TYPE_B: FacilityTypeId = FacilityTypeId::new(2);
    const TYPE_C: FacilityTypeId = FacilityTypeId::new(3);

    fn rule(id: i64, target: FacilityTypeId, required: FacilityTypeId, price: i64) -> PricingRule {
        PricingRule {
            id: PricingRuleId::new(id),
            facility_type_id: target,
            required_facility_type_id: required,
            special_price: Money::from_units(price),
            description: format!("rule {}", id),
            active: true,
        }
    }

    fn calculator() -> SuggestedPriceCalculator {
        SuggestedPriceCalculator::new(vec![
            rule(1, TYPE_A, TYPE_B, 80),
            rule(2, TYPE_A, TYPE_C, 60),
        ])
    }

    #[test]
    fn lowest_applicable_price_wins() {
        let price = calculator().calculate_suggested_price(
            TYPE_A,
            Money::from_units(100),
            &[TYPE_B, TYPE_C],
        );
        assert_eq!(price, Money::from_units(60));
    }

    #[test]
    fn base_price_without_held_types() {
        let price = calculator().calculate_suggested_price(TYPE_A, Money::from_units(100), &[]);
        assert_eq!(price, Money::from_units(100));
    }

    #[test]
    fn base_price_for_type_without_rules() {
        let price =
            calculator().calculate_suggested_price(TYPE_C, Money::from_units(45), &[TYPE_A, TYPE_B]);
        assert_eq!(price, Money::from_units(45));
    }

    #[test]
    fn special_price_wins_even_above_base() {
        let calc = SuggestedPriceCalculator::new(vec![rule(1, TYPE_A, TYPE_B, 150)]);
        let price = calc.calculate_suggested_price(TYPE_A, Money::from_units(100), &[TYPE_B]);
        assert_eq!(price, Money::from_units(150));
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut inactive = rule(3, TYPE_A, TYPE_B, 10);
        inactive.active = false;
        let calc = SuggestedPriceCalculator::new(vec![inactive, rule(1, TYPE_A, TYPE_B, 80)]);

        assert_eq!(calc.rule_count(), 1);
        assert_eq!(
            calc.calculate_suggested_price(TYPE_A, Money::from_units(100), &[TYPE_B]),
            Money::from_units(80)
        );
    }

    #[test]
    fn applicable_rules_keep_registration_order() {
        let rules = calculator().applicable_pricing_rules(TYPE_A, &[TYPE_C, TYPE_B]);
        let ids: Vec<_> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![PricingRuleId::new(1), PricingRuleId::new(2)]);
    }

    #[test]
    fn applicable_rules_filter_by_held_types() {
        let rules = calculator().applicable_pricing_rules(TYPE_A, &[TYPE_B]);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].required_facility_type_id, TYPE_B);
        assert!(calculator().applicable_pricing_rules(TYPE_B, &[TYPE_A]).is_empty());
    }

    #[test]
    fn first_registered_rule_wins_ties() {
        let calc = SuggestedPriceCalculator::new(vec![
            rule(7, TYPE_A, TYPE_B, 50),
            rule(8, TYPE_A, TYPE_C, 50),
        ]);
        let best = calc.best_rule(TYPE_A, &[TYPE_B, TYPE_C]).map(|r| r.id);
        assert_eq!(best, Some(PricingRuleId::new(7)));
    }

    #[test]
    fn best_rule_outlives_held_types() {
        let calc = calculator();
        let best = {
            let held = vec![TYPE_B, TYPE_C];
            calc.best_rule(TYPE_A, &held)
        };
        assert_eq!(best.map(|r| r.special_price), Some(Money::from_units(60)));
    }

    proptest! {
        #[test]
        fn result_is_minimum_of_applicable_or_base(
            prices in proptest::collection::vec(0i64..100_000, 0..8),
            base in 0i64..100_000,
            held_mask in any::<u8>(),
        ) {
            let rules: Vec<_> = prices
                .iter()
                .enumerate()
                .map(|(i, cents)| PricingRule {
                    id: PricingRuleId::new(i as i64),
                    facility_type_id: TYPE_A,
                    required_facility_type_id: FacilityTypeId::new(10 + i as i64),
                    special_price: Money::from_cents(*cents),
                    description: String::new(),
                    active: true,
                })
                .collect();
            let held: Vec<_> = (0..prices.len())
                .filter(|i| held_mask & (1 << i) != 0)
                .map(|i| FacilityTypeId::new(10 + i as i64))
                .collect();

            let calc = SuggestedPriceCalculator::new(rules);
            let price = calc.calculate_suggested_price(TYPE_A, Money::from_cents(base), &held);

            let expected = (0..prices.len())
                .filter(|i| held_mask & (1 << i) != 0)
                .map(|i| prices[i])
                .min()
                .unwrap_or(base);
            prop_assert_eq!(price, Money::from_cents(expected));
        }
    }
}
