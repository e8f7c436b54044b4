//! Giftwell - donation processing backend
//!
//! This library provides the core functionality for the Giftwell donation
//! platform: database operations, payment provider integration, webhook
//! reconciliation, and API handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod id;
pub mod models;
pub mod payments;
pub mod reconcile;
