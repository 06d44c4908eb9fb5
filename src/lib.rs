//! Curtail - a multi-tenant URL shortener
//!
//! Anonymous and account-owned short links with custom slugs, QR codes,
//! activation/expiry windows, password protection and per-link click
//! analytics.
//!
//! # Architecture
//! - `storage`: sea-orm document store facade (SQLite/MySQL/PostgreSQL)
//! - `services`: creation, resolution, click recording, analytics, accounts
//! - `api`: actix-web handlers, identity extraction, response envelope
//! - `config`: startup configuration, injected into components
//! - `utils`: alias generation, password hashing, URL/QR/device helpers

pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod services;
pub mod storage;
pub mod utils;
