//! ecopreco: terminal storefront and admin client for the eco-price catalog.
//!
//! Core layers, leaves first:
//! - `session`: token, username and roles persisted in sled
//! - `client`: reqwest request issuing, bearer injection, error normalization
//! - `query`: listing URL construction (list-all / filter / search)
//!
//! `catalog` types every backend endpoint on top of the client; `controllers`
//! bind user input to those calls and report a status line.

pub mod catalog;
pub mod client;
pub mod compare;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod render;
pub mod session;

pub use client::ApiClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use session::SessionStore;
