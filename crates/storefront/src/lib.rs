//! Marketstall Storefront library.
//!
//! Typed client for the Marketstall REST API plus the client-side state that
//! sits on top of it: session, cart, product cache, orders, categories and
//! checkout. The CLI and the admin crate build on these pieces.
//!
//! # Layers
//!
//! - [`http`] - `ApiClient`: bearer injection, status mapping, 401 handling
//! - [`services`] - one thin service per API area
//! - [`listing`] - debounced, sequenced paginated list views
//! - [`stores`] - stateful handles the views drive
//! - [`guard`] - session and admin checks run before protected views
//! - [`state`] - `Storefront`, every store wired to one client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod listing;
pub mod notify;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod stores;

pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::ApiClient;
pub use state::Storefront;
