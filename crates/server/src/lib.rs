//! Tally server library.
//!
//! Multi-tenant inventory and sales ledger with a grounded assistant. This
//! crate exposes the server as a library so integration tests can exercise
//! the services and repositories directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
