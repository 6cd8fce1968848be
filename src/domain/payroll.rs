//! Cleaner pay calculation
//!
//! Pure functions behind the roster service: per-cleaner pay from a payment
//! type and its rate fields, and the primary cleaner's derived hours/pay.
//! The primary cleaner is special — their hours are whatever remains of the
//! booking's total after every additional cleaner's assigned hours are
//! subtracted, and their pay is recomputed whenever the roster changes.

use serde::{Deserialize, Serialize};

/// How a cleaner assignment is compensated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Hourly,
    Percentage,
    Fixed,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Hourly => "hourly",
            PaymentType::Percentage => "percentage",
            PaymentType::Fixed => "fixed",
        }
    }

    /// Unknown strings parse to `None`; callers treat that as zero pay so
    /// historical rows with retired types stay readable.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(PaymentType::Hourly),
            "percentage" => Some(PaymentType::Percentage),
            "fixed" => Some(PaymentType::Fixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate fields for one assignment; only the field matching the payment
/// type is consulted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RateFields {
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub hours_assigned: Option<f64>,
}

/// Pay for one assignment. Absent rate fields contribute zero rather than
/// erroring; an unparseable payment type (`None`) pays zero.
pub fn calculate_pay(payment_type: Option<PaymentType>, total_cost: f64, rates: RateFields) -> f64 {
    match payment_type {
        Some(PaymentType::Hourly) => match (rates.hours_assigned, rates.hourly_rate) {
            (Some(hours), Some(rate)) => hours * rate,
            _ => 0.0,
        },
        Some(PaymentType::Percentage) => {
            total_cost * rates.percentage_rate.unwrap_or(0.0) / 100.0
        }
        Some(PaymentType::Fixed) => rates.fixed_amount.unwrap_or(0.0),
        None => 0.0,
    }
}

/// The booking-level rate configuration for the primary cleaner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PrimaryRateConfig {
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
}

/// Hours left for the primary after the additional cleaners' hours are
/// subtracted. Never negative.
pub fn primary_hours(total_hours: f64, additional_hours: f64) -> f64 {
    (total_hours - additional_hours).max(0.0)
}

/// Primary pay from the booking-level rate config.
///
/// Priority: configured hourly rate, then percentage of the booking total,
/// then the platform default hourly rate when neither is configured.
pub fn primary_pay(
    config: PrimaryRateConfig,
    hours: f64,
    total_cost: f64,
    default_hourly_rate: f64,
) -> f64 {
    if let Some(rate) = config.hourly_rate {
        hours * rate
    } else if let Some(percentage) = config.percentage_rate {
        total_cost * percentage / 100.0
    } else {
        hours * default_hourly_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_pay_is_hours_times_rate() {
        let pay = calculate_pay(
            Some(PaymentType::Hourly),
            500.0,
            RateFields {
                hourly_rate: Some(15.0),
                hours_assigned: Some(4.0),
                ..RateFields::default()
            },
        );
        assert_eq!(pay, 60.0);
    }

    #[test]
    fn hourly_pay_is_zero_when_a_field_is_absent() {
        let missing_rate = RateFields {
            hours_assigned: Some(4.0),
            ..RateFields::default()
        };
        assert_eq!(calculate_pay(Some(PaymentType::Hourly), 500.0, missing_rate), 0.0);

        let missing_hours = RateFields {
            hourly_rate: Some(15.0),
            ..RateFields::default()
        };
        assert_eq!(calculate_pay(Some(PaymentType::Hourly), 500.0, missing_hours), 0.0);
    }

    #[test]
    fn percentage_pay_is_share_of_total() {
        let pay = calculate_pay(
            Some(PaymentType::Percentage),
            500.0,
            RateFields {
                percentage_rate: Some(25.0),
                ..RateFields::default()
            },
        );
        assert_eq!(pay, 125.0);
    }

    #[test]
    fn fixed_pay_is_verbatim() {
        let pay = calculate_pay(
            Some(PaymentType::Fixed),
            500.0,
            RateFields {
                fixed_amount: Some(80.0),
                ..RateFields::default()
            },
        );
        assert_eq!(pay, 80.0);
    }

    #[test]
    fn unknown_payment_type_pays_zero() {
        assert_eq!(PaymentType::parse("barter"), None);
        let rates = RateFields {
            hourly_rate: Some(15.0),
            percentage_rate: Some(25.0),
            fixed_amount: Some(80.0),
            hours_assigned: Some(4.0),
        };
        assert_eq!(calculate_pay(None, 500.0, rates), 0.0);
    }

    #[test]
    fn primary_hours_subtract_all_additional_cleaners() {
        // 10 total, one additional cleaner with 3 hours, then a second with 2
        assert_eq!(primary_hours(10.0, 3.0), 7.0);
        assert_eq!(primary_hours(10.0, 3.0 + 2.0), 5.0);
    }

    #[test]
    fn primary_hours_never_negative() {
        assert_eq!(primary_hours(4.0, 6.5), 0.0);
    }

    #[test]
    fn primary_pay_prefers_hourly_then_percentage_then_default() {
        let both = PrimaryRateConfig {
            hourly_rate: Some(18.0),
            percentage_rate: Some(30.0),
        };
        assert_eq!(primary_pay(both, 5.0, 400.0, 15.0), 90.0);

        let percentage_only = PrimaryRateConfig {
            hourly_rate: None,
            percentage_rate: Some(30.0),
        };
        assert_eq!(primary_pay(percentage_only, 5.0, 400.0, 15.0), 120.0);

        let unconfigured = PrimaryRateConfig::default();
        assert_eq!(primary_pay(unconfigured, 5.0, 400.0, 15.0), 75.0);
    }
}
