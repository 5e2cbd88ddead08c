//! # knap-solver: Water-filling budget allocation.
//!
//! Splits a budget across channels with concave (or S-shaped) response
//! curves so that total response is maximal:
//! - **Channel profiling**: each channel gets a search range (its reach) and
//!   an opening marginal return. S-shaped curves open at the spend that
//!   maximizes their average return, i.e. they are funded along their
//!   concave envelope.
//! - **Marginal equalization**: a bisection over the shared marginal price λ
//!   finds the point where every funded channel returns the same value per
//!   extra unit of spend and the spends add up to the budget.
//! - **Saturation**: once every channel's marginal return falls below the
//!   saturation floor, leftover budget stays unspent.

pub mod allocator;
pub mod config;
pub mod knapsack;
mod profile;

pub use allocator::{spend_at_marginal, Allocator};
pub use knapsack::Knapsack;
