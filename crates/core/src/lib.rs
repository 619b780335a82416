//! Myshop Core - Shared types library.
//!
//! This crate provides the domain types shared by the Myshop components:
//! - `storefront` - Shop, cart, orders and admin overview (web binary)
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, decimal prices and validated cart quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
