//! Personal diet tracker.
//!
//! Keeps a biometric profile with history, derives daily calorie and macro
//! targets from it, and tracks logged meals against those targets.

pub mod biometrics;
pub mod catalog;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod exercise;
pub mod ledger;
pub mod models;
pub mod needs;
pub mod prompt;
pub mod storage;
pub mod units;

pub use client::DietClient;
pub use error::{DietError, Result};
pub use models::*;
pub use needs::compute_daily_targets;
