//! Domain types and the pricing/payout engine
//!
//! The calculators in here are pure: they take an explicit `RuleSet`
//! snapshot and booking attributes and return derived values. All I/O
//! lives in the `services` and `routes` layers.

#![allow(dead_code)]

pub mod bookings;
pub mod payroll;
pub mod quote;
pub mod rates;
