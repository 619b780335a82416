//! Myshop storefront library.
//!
//! Session-backed shopping cart, catalog and checkout for the Myshop
//! storefront. The binary in `main.rs` wires these modules into a server;
//! keeping them in a library lets the router be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod urls;
