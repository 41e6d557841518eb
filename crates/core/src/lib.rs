//! Fashion Store Core - Shared domain types.
//!
//! This crate provides the types shared by every Fashion Store component:
//! - `storefront` - Public shop and the `/admin` back-office
//! - `cli` - Migrations, seed data, and admin account tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Stock arithmetic and currency/date formatting live
//! here so they can be tested without a running store.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, sizes, stock counters, statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
