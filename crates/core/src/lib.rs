//! Marketstall Core - Shared domain types.
//!
//! This crate provides the types used across all Marketstall components:
//! - `storefront` - API client and client-side stores for shoppers
//! - `admin` - API client and stores for the back-office
//! - `cli` - Command-line front end driving both
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no timers. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - IDs, money, catalog, user, order, cart and validation types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
