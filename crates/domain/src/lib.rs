//! Domain layer for the Gift Registry backend.
//!
//! This crate contains:
//! - Domain models (Cart, Gift, WeddingList, MoneyBag, Invitee)
//! - Request/response types with validation
//! - The payment gateway trait and its error types

pub mod models;
pub mod services;
