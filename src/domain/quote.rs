//! Quote calculation engine
//!
//! Computes a booking's full price breakdown from the selected property
//! attributes and a `RuleSet` snapshot. The calculation is staged:
//!
//! 1. Base cost: sum of fixed per-attribute costs (property type, bedrooms,
//!    bathrooms, kitchen/living layout, additional rooms, house-share areas).
//! 2. Percentage adjustment: condition + furniture percents are summed and
//!    applied once to the base cost.
//! 3. Fixed extras: oven cleaning, blinds, extra services, additional
//!    services, and the steam-cleaning bundle (which carries its own flat
//!    20% discount). None of these are percentage-adjusted.
//! 4. Discounts: the short-notice charge is added into the subtotal, then
//!    the 10% first-time-customer discount is taken off the whole subtotal.
//!
//! Every intermediate value is exposed on `QuoteResult` so the client can
//! render the breakdown. The function is pure: same input + same snapshot
//! gives an identical result. No rounding happens here; amounts stay full
//! precision and display rounding is the client's concern.

use serde::{Deserialize, Serialize};

use super::rates::{RateCategory, RuleSet};

/// Flat discount applied to the steam-cleaning bundle.
pub const STEAM_CLEANING_DISCOUNT_RATE: f64 = 0.20;

/// Discount applied to the full subtotal for first-time customers.
pub const FIRST_TIME_DISCOUNT_RATE: f64 = 0.10;

/// One itemized line (blinds, extra services, steam-cleaning items).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
}

impl LineItem {
    pub fn total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

fn items_total(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::total).sum()
}

/// The full set of user-selected booking attributes.
///
/// Single-select attributes are `Option<String>` (the option key looked up
/// against the rule set); multi-select attributes are `Vec<String>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteInput {
    pub property_type: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub kitchen_living_layout: Option<String>,
    #[serde(default)]
    pub additional_rooms: Vec<String>,
    #[serde(default)]
    pub house_share_areas: Vec<String>,
    #[serde(default)]
    pub additional_services: Vec<String>,
    pub property_condition: Option<String>,
    pub furniture_status: Option<String>,
    pub oven_type: Option<String>,
    #[serde(default)]
    pub blinds: Vec<LineItem>,
    #[serde(default)]
    pub extra_services: Vec<LineItem>,
    #[serde(default)]
    pub carpet_items: Vec<LineItem>,
    #[serde(default)]
    pub upholstery_items: Vec<LineItem>,
    #[serde(default)]
    pub mattress_items: Vec<LineItem>,
    #[serde(default)]
    pub short_notice_charge: f64,
    #[serde(default)]
    pub is_first_time_customer: bool,
}

/// Derived, immutable price breakdown. Recomputed in full whenever any
/// input field changes; never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub base_cost: f64,
    pub condition_percentage: f64,
    pub furniture_percentage: f64,
    pub adjusted_base_cost: f64,
    pub oven_cleaning_cost: f64,
    pub blinds_total: f64,
    pub extras_total: f64,
    pub additional_services_total: f64,
    pub steam_cleaning_total: f64,
    pub steam_cleaning_discount: f64,
    pub steam_cleaning_final: f64,
    pub short_notice_charge: f64,
    pub subtotal_before_discounts: f64,
    pub first_time_discount: f64,
    pub total_cost: f64,
    pub total_time_minutes: u32,
    pub estimated_hours: f64,
}

/// Running cost/time accumulator for the base-cost stage.
#[derive(Debug, Default)]
struct Accumulator {
    cost: f64,
    minutes: u32,
}

impl Accumulator {
    fn add_option(&mut self, rules: &RuleSet, category: RateCategory, option: &str) {
        let (value, minutes) = rules.cost_of(category, option);
        self.cost += value;
        self.minutes += minutes;
    }

    fn add_selected(&mut self, rules: &RuleSet, category: RateCategory, option: Option<&String>) {
        if let Some(option) = option {
            self.add_option(rules, category, option);
        }
    }

    fn add_multi(&mut self, rules: &RuleSet, category: RateCategory, options: &[String]) {
        for option in options {
            self.add_option(rules, category, option);
        }
    }
}

/// Compute the full price breakdown for one set of booking attributes.
pub fn calculate_quote(input: &QuoteInput, rules: &RuleSet) -> QuoteResult {
    let mut minutes: u32 = 0;

    // Stage 1: base cost from fixed per-attribute rules.
    let mut base = Accumulator::default();
    base.add_selected(rules, RateCategory::PropertyType, input.property_type.as_ref());
    base.add_selected(rules, RateCategory::Bedrooms, input.bedrooms.as_ref());
    base.add_selected(rules, RateCategory::Bathrooms, input.bathrooms.as_ref());
    base.add_selected(
        rules,
        RateCategory::KitchenLivingLayout,
        input.kitchen_living_layout.as_ref(),
    );
    base.add_multi(rules, RateCategory::AdditionalRooms, &input.additional_rooms);
    base.add_multi(rules, RateCategory::HouseShareAreas, &input.house_share_areas);
    let base_cost = base.cost;
    minutes += base.minutes;

    // Stage 2: condition + furniture percents, summed and applied once to
    // the same base. Their own time estimates are added unscaled.
    let (condition_percentage, condition_minutes) = match &input.property_condition {
        Some(option) => rules.percent_of(RateCategory::PropertyCondition, option),
        None => (0.0, 0),
    };
    let (furniture_percentage, furniture_minutes) = match &input.furniture_status {
        Some(option) => rules.percent_of(RateCategory::FurnitureStatus, option),
        None => (0.0, 0),
    };
    minutes += condition_minutes + furniture_minutes;
    let adjusted_base_cost =
        base_cost * (1.0 + (condition_percentage + furniture_percentage) / 100.0);

    // Stage 3: fixed extras, never percentage-adjusted.
    //
    // The oven value is added as-is. The configured "no_oven_cleaning" rule
    // carries a negative value to net out the default oven included in the
    // base-cost rules; if the base rules stop including one, that rule must
    // be reconfigured to zero.
    let (oven_cleaning_cost, oven_minutes) = match input.oven_type.as_deref() {
        None | Some("none") => (0.0, 0),
        Some(oven_type) => rules.cost_of(RateCategory::OvenCleaning, oven_type),
    };
    minutes += oven_minutes;

    let blinds_total = items_total(&input.blinds);
    let extras_total = items_total(&input.extra_services);

    let mut additional = Accumulator::default();
    additional.add_multi(rules, RateCategory::AdditionalServices, &input.additional_services);
    let additional_services_total = additional.cost;
    minutes += additional.minutes;

    // Steam cleaning bundle: one flat discount across carpet, upholstery
    // and mattress items no matter how many of the lists are populated.
    let steam_cleaning_total = items_total(&input.carpet_items)
        + items_total(&input.upholstery_items)
        + items_total(&input.mattress_items);
    let steam_cleaning_discount = steam_cleaning_total * STEAM_CLEANING_DISCOUNT_RATE;
    let steam_cleaning_final = steam_cleaning_total - steam_cleaning_discount;

    // Stage 4: the short-notice charge goes into the subtotal first, so a
    // first-time customer is discounted on it too.
    let subtotal_before_discounts = adjusted_base_cost
        + oven_cleaning_cost
        + blinds_total
        + extras_total
        + additional_services_total
        + steam_cleaning_final
        + input.short_notice_charge;

    let first_time_discount = if input.is_first_time_customer {
        subtotal_before_discounts * FIRST_TIME_DISCOUNT_RATE
    } else {
        0.0
    };
    let total_cost = subtotal_before_discounts - first_time_discount;

    QuoteResult {
        base_cost,
        condition_percentage,
        furniture_percentage,
        adjusted_base_cost,
        oven_cleaning_cost,
        blinds_total,
        extras_total,
        additional_services_total,
        steam_cleaning_total,
        steam_cleaning_discount,
        steam_cleaning_final,
        short_notice_charge: input.short_notice_charge,
        subtotal_before_discounts,
        first_time_discount,
        total_cost,
        total_time_minutes: minutes,
        estimated_hours: f64::from(minutes) / 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rates::{RateRule, ValueType};

    fn amount(category: RateCategory, option: &str, value: f64, minutes: u32) -> RateRule {
        RateRule {
            category,
            option: option.to_string(),
            value,
            value_type: ValueType::Amount,
            time_minutes: minutes,
        }
    }

    fn percent(category: RateCategory, option: &str, value: f64, minutes: u32) -> RateRule {
        RateRule {
            category,
            option: option.to_string(),
            value,
            value_type: ValueType::Percentage,
            time_minutes: minutes,
        }
    }

    fn item(quantity: u32, unit_price: f64) -> LineItem {
        LineItem {
            description: None,
            quantity,
            unit_price,
        }
    }

    fn standard_rules() -> RuleSet {
        RuleSet::new(vec![
            amount(RateCategory::PropertyType, "house", 40.0, 30),
            amount(RateCategory::Bedrooms, "2", 30.0, 60),
            amount(RateCategory::Bathrooms, "1", 20.0, 45),
            amount(RateCategory::KitchenLivingLayout, "separate", 10.0, 30),
            amount(RateCategory::AdditionalRooms, "study", 15.0, 30),
            amount(RateCategory::AdditionalRooms, "conservatory", 25.0, 45),
            amount(RateCategory::AdditionalServices, "balcony", 12.0, 20),
            amount(RateCategory::OvenCleaning, "double", 45.0, 60),
            amount(RateCategory::OvenCleaning, "no_oven_cleaning", -25.0, 0),
            percent(RateCategory::PropertyCondition, "very_dirty", 20.0, 60),
            percent(RateCategory::FurnitureStatus, "furnished", 10.0, 30),
        ])
    }

    #[test]
    fn empty_input_quotes_zero() {
        let result = calculate_quote(&QuoteInput::default(), &standard_rules());
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.estimated_hours, 0.0);
    }

    #[test]
    fn base_cost_sums_selected_attributes() {
        let input = QuoteInput {
            property_type: Some("house".to_string()),
            bedrooms: Some("2".to_string()),
            bathrooms: Some("1".to_string()),
            kitchen_living_layout: Some("separate".to_string()),
            additional_rooms: vec!["study".to_string(), "conservatory".to_string()],
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.base_cost, 140.0);
        // 30 + 60 + 45 + 30 + 30 + 45 minutes
        assert_eq!(result.total_time_minutes, 240);
        assert_eq!(result.estimated_hours, 4.0);
    }

    #[test]
    fn unconfigured_options_price_nothing() {
        let input = QuoteInput {
            bedrooms: Some("9".to_string()),
            additional_rooms: vec!["panic_room".to_string()],
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.base_cost, 0.0);
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn adjusted_base_equals_base_without_percentages() {
        let input = QuoteInput {
            bedrooms: Some("2".to_string()),
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.adjusted_base_cost, result.base_cost);
    }

    #[test]
    fn percentages_sum_before_applying() {
        let input = QuoteInput {
            bedrooms: Some("2".to_string()),
            bathrooms: Some("1".to_string()),
            property_condition: Some("very_dirty".to_string()),
            furniture_status: Some("furnished".to_string()),
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.base_cost, 50.0);
        assert_eq!(result.condition_percentage, 20.0);
        assert_eq!(result.furniture_percentage, 10.0);
        // 50 × 1.30, not 50 × 1.20 × 1.10
        assert_eq!(result.adjusted_base_cost, 65.0);
        // percentage rules' time is added unscaled: 60 + 45 + 60 + 30
        assert_eq!(result.total_time_minutes, 195);
    }

    #[test]
    fn oven_value_added_as_is_including_negative() {
        let mut input = QuoteInput {
            bedrooms: Some("2".to_string()),
            oven_type: Some("double".to_string()),
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.oven_cleaning_cost, 45.0);
        assert_eq!(result.total_cost, 75.0);

        input.oven_type = Some("no_oven_cleaning".to_string());
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.oven_cleaning_cost, -25.0);
        assert_eq!(result.total_cost, 5.0);

        input.oven_type = Some("none".to_string());
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.oven_cleaning_cost, 0.0);
    }

    #[test]
    fn itemized_lists_multiply_quantity_by_unit_price() {
        let input = QuoteInput {
            blinds: vec![item(3, 8.0), item(1, 12.0)],
            extra_services: vec![item(2, 10.0)],
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.blinds_total, 36.0);
        assert_eq!(result.extras_total, 20.0);
        assert_eq!(result.total_cost, 56.0);
    }

    #[test]
    fn steam_cleaning_discount_is_flat_twenty_percent() {
        // one list populated
        let input = QuoteInput {
            carpet_items: vec![item(2, 25.0)],
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.steam_cleaning_total, 50.0);
        assert_eq!(result.steam_cleaning_discount, 10.0);
        assert_eq!(result.steam_cleaning_final, 40.0);

        // all three lists populated, same 20%
        let input = QuoteInput {
            carpet_items: vec![item(2, 25.0)],
            upholstery_items: vec![item(1, 30.0)],
            mattress_items: vec![item(2, 10.0)],
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.steam_cleaning_total, 100.0);
        assert_eq!(result.steam_cleaning_discount, 20.0);
        assert_eq!(result.steam_cleaning_final, 80.0);
    }

    #[test]
    fn first_time_discount_applies_to_full_subtotal() {
        let input = QuoteInput {
            bedrooms: Some("2".to_string()),
            short_notice_charge: 20.0,
            is_first_time_customer: true,
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.subtotal_before_discounts, 50.0);
        // the short-notice charge is discounted too
        assert_eq!(result.first_time_discount, 5.0);
        assert_eq!(result.total_cost, 45.0);

        let returning = QuoteInput {
            is_first_time_customer: false,
            ..input
        };
        let result = calculate_quote(&returning, &standard_rules());
        assert_eq!(result.first_time_discount, 0.0);
        assert_eq!(result.total_cost, result.subtotal_before_discounts);
    }

    #[test]
    fn end_to_end_breakdown() {
        // base 100, +20% condition +10% furniture, oven 15, short notice 20,
        // first-time customer.
        let rules = RuleSet::new(vec![
            amount(RateCategory::Bedrooms, "4", 100.0, 120),
            amount(RateCategory::OvenCleaning, "single", 15.0, 30),
            percent(RateCategory::PropertyCondition, "dirty", 20.0, 0),
            percent(RateCategory::FurnitureStatus, "furnished", 10.0, 0),
        ]);
        let input = QuoteInput {
            bedrooms: Some("4".to_string()),
            property_condition: Some("dirty".to_string()),
            furniture_status: Some("furnished".to_string()),
            oven_type: Some("single".to_string()),
            short_notice_charge: 20.0,
            is_first_time_customer: true,
            ..QuoteInput::default()
        };
        let result = calculate_quote(&input, &rules);
        assert_eq!(result.adjusted_base_cost, 130.0);
        assert_eq!(result.subtotal_before_discounts, 165.0);
        assert_eq!(result.first_time_discount, 16.5);
        assert_eq!(result.total_cost, 148.5);
    }

    #[test]
    fn input_deserializes_with_sparse_body() {
        // request bodies omit everything the customer didn't select
        let input: QuoteInput = serde_json::from_str(
            r#"{"bedrooms": "2", "carpet_items": [{"description": null, "quantity": 1, "unit_price": 25.0}]}"#,
        )
        .unwrap();
        assert_eq!(input.bedrooms.as_deref(), Some("2"));
        assert!(input.additional_rooms.is_empty());
        assert_eq!(input.short_notice_charge, 0.0);
        assert!(!input.is_first_time_customer);

        let result = calculate_quote(&input, &standard_rules());
        assert_eq!(result.steam_cleaning_final, 20.0);
        assert_eq!(result.total_cost, 50.0);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let rules = standard_rules();
        let input = QuoteInput {
            property_type: Some("house".to_string()),
            bedrooms: Some("2".to_string()),
            property_condition: Some("very_dirty".to_string()),
            carpet_items: vec![item(3, 22.5)],
            short_notice_charge: 17.35,
            is_first_time_customer: true,
            ..QuoteInput::default()
        };
        let first = calculate_quote(&input, &rules);
        let second = calculate_quote(&input, &rules);
        assert_eq!(first, second);
    }
}
