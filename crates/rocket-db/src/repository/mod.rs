//! # Repository Module
//!
//! SQLite-backed repositories.
//!
//! ## Available Repositories
//!
//! - [`local_storage::LocalStorage`] - durable key-value rows, the default
//!   `KeyValueStore` backend for the cart

pub mod local_storage;
