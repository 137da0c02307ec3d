//! Shared utilities and common types for the Gift Registry backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Money conversion between decimal amounts and provider minor units
//! - Common validation logic

pub mod money;
pub mod validation;
