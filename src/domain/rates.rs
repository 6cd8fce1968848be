//! Rate rule types
//!
//! A rate rule is one configured cost/time contribution for a
//! `(category, option)` pair, e.g. `(bedrooms, "3")` or
//! `(property_condition, "very_dirty")`. Rules are configured by operators
//! and consumed as an immutable snapshot (`RuleSet`) by the quote engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a rule's `value` is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// A currency amount added to (or, when negative, subtracted from) totals.
    Amount,
    /// A whole-number percent applied to the aggregated base cost.
    Percentage,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Amount => "amount",
            ValueType::Percentage => "percentage",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "amount" => Some(ValueType::Amount),
            "percentage" => Some(ValueType::Percentage),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of rule categories consulted by the quote engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    PropertyType,
    Bedrooms,
    Bathrooms,
    KitchenLivingLayout,
    AdditionalRooms,
    HouseShareAreas,
    AdditionalServices,
    OvenCleaning,
    PropertyCondition,
    FurnitureStatus,
}

impl RateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateCategory::PropertyType => "property_type",
            RateCategory::Bedrooms => "bedrooms",
            RateCategory::Bathrooms => "bathrooms",
            RateCategory::KitchenLivingLayout => "kitchen_living_layout",
            RateCategory::AdditionalRooms => "additional_rooms",
            RateCategory::HouseShareAreas => "house_share_areas",
            RateCategory::AdditionalServices => "additional_services",
            RateCategory::OvenCleaning => "oven_cleaning",
            RateCategory::PropertyCondition => "property_condition",
            RateCategory::FurnitureStatus => "furniture_status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "property_type" => Some(RateCategory::PropertyType),
            "bedrooms" => Some(RateCategory::Bedrooms),
            "bathrooms" => Some(RateCategory::Bathrooms),
            "kitchen_living_layout" => Some(RateCategory::KitchenLivingLayout),
            "additional_rooms" => Some(RateCategory::AdditionalRooms),
            "house_share_areas" => Some(RateCategory::HouseShareAreas),
            "additional_services" => Some(RateCategory::AdditionalServices),
            "oven_cleaning" => Some(RateCategory::OvenCleaning),
            "property_condition" => Some(RateCategory::PropertyCondition),
            "furniture_status" => Some(RateCategory::FurnitureStatus),
            _ => None,
        }
    }
}

impl std::fmt::Display for RateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured rule: cost/percent value plus a time estimate in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRule {
    pub category: RateCategory,
    pub option: String,
    pub value: f64,
    pub value_type: ValueType,
    pub time_minutes: u32,
}

/// Immutable snapshot of the active rules, keyed by `(category, option)`.
///
/// A lookup that finds no rule contributes zero cost and zero time — an
/// unconfigured option is not an error, it just doesn't price anything yet.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<(RateCategory, String), RateRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RateRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| ((r.category, r.option.clone()), r))
            .collect();
        Self { rules }
    }

    pub fn get(&self, category: RateCategory, option: &str) -> Option<&RateRule> {
        self.rules.get(&(category, option.to_string()))
    }

    /// Cost amount and time for an option, zero when unconfigured.
    pub fn cost_of(&self, category: RateCategory, option: &str) -> (f64, u32) {
        match self.get(category, option) {
            Some(rule) => (rule.value, rule.time_minutes),
            None => (0.0, 0),
        }
    }

    /// Percent value and time for an option, zero when unconfigured.
    pub fn percent_of(&self, category: RateCategory, option: &str) -> (f64, u32) {
        self.cost_of(category, option)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(category: RateCategory, option: &str, value: f64, time: u32) -> RateRule {
        RateRule {
            category,
            option: option.to_string(),
            value,
            value_type: ValueType::Amount,
            time_minutes: time,
        }
    }

    #[test]
    fn lookup_returns_configured_rule() {
        let rules = RuleSet::new(vec![rule(RateCategory::Bedrooms, "2", 30.0, 60)]);
        assert_eq!(rules.cost_of(RateCategory::Bedrooms, "2"), (30.0, 60));
    }

    #[test]
    fn missing_rule_contributes_zero() {
        let rules = RuleSet::new(vec![]);
        assert_eq!(rules.cost_of(RateCategory::Bedrooms, "5"), (0.0, 0));
        assert!(rules.get(RateCategory::OvenCleaning, "single").is_none());
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in [
            RateCategory::PropertyType,
            RateCategory::Bedrooms,
            RateCategory::Bathrooms,
            RateCategory::KitchenLivingLayout,
            RateCategory::AdditionalRooms,
            RateCategory::HouseShareAreas,
            RateCategory::AdditionalServices,
            RateCategory::OvenCleaning,
            RateCategory::PropertyCondition,
            RateCategory::FurnitureStatus,
        ] {
            assert_eq!(RateCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(RateCategory::parse("garden_gnomes"), None);
    }
}
