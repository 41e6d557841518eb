//! Business logic services for the storefront and back-office.
//!
//! # Services
//!
//! - `auth` - Password accounts (register, login, profile changes)
//! - `authz` - The admin predicate shared by extractors and services
//! - `cart` - Session cart storage and pricing
//! - `catalog` - Product forms, image files, category deletion
//! - `email` - SMTP relay
//! - `ledger` - Checkout and order status changes
//! - `notifications` - Order emails, best effort
//! - `stock` - Guarded back-office stock adjustments

pub mod auth;
pub mod authz;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod ledger;
pub mod notifications;
pub mod stock;
