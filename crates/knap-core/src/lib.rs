//! # knap-core
//! Foundation types and traits for budget allocation across response curves.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
