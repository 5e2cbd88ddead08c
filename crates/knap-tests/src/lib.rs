//! Integration test suite for knap.
//!
//! Exercises the allocator end to end through the reference curves and the
//! `Knapsack` builder. Properties that must hold for every solve live in
//! `tests/properties.rs`; the seven-channel media plan lives in
//! `tests/media_mix.rs`.

pub mod helpers;
