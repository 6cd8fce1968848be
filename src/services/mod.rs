//! Service layer: the I/O boundary around the pure calculators.
//!
//! `rates` loads/stores the rule snapshot; `roster` owns every mutation of
//! cleaner assignments and the primary reconciliation that goes with them.

pub mod rates;
pub mod roster;
