//! Core types and trait definitions for the wishlist service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the API layer both depend on it.

pub mod error;
pub mod lifecycle;
pub mod store;
pub mod wish;

pub use error::{Classify, Error, ErrorKind, Result};
