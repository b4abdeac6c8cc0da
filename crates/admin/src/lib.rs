//! Marketstall Admin library.
//!
//! Back-office access to the Marketstall API: product management with image
//! uploads, order status changes, user search and the dashboard. Everything
//! here requires an admin session; [`AdminConsole::open`] checks it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod services;
pub mod state;
pub mod stores;

pub use error::AdminError;
pub use state::AdminConsole;
