//! Foodgram Core - domain types and rules.
//!
//! This crate holds everything about recipes that does not need I/O:
//! - `api` - HTTP service backed by Postgres
//! - `cli` - Command-line tools for migrations, imports and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database
//! access, no HTTP. Storage code in `api` feeds these functions rows and
//! persists what they return.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, slugs and colors
//! - [`recipe`] - Recipe write payloads and their validation
//! - [`image`] - Base64 data-URI decoding
//! - [`views`] - Read representations
//! - [`filter`] - Recipe list filters
//! - [`search`] - Ingredient name search
//! - [`collection`] - Favorites and shopping cart toggles
//! - [`follow`] - Subscription rules
//! - [`shopping_list`] - Cart aggregation and rendering
//! - [`pagination`] - Page requests and response envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collection;
pub mod filter;
pub mod follow;
pub mod image;
pub mod pagination;
pub mod recipe;
pub mod search;
pub mod shopping_list;
pub mod types;
pub mod views;

pub use types::*;
