//! Core types and trait definitions for the AlpenWegs API.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the visibility policy that decides which rows a requester may list, the
//! filter and pagination vocabulary, and the [`store::Store`] abstraction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod filter;
pub mod page;
pub mod principal;
pub mod registration;
pub mod resource;
pub mod store;
pub mod track;
pub mod user;
pub mod visibility;

pub use error::{Error, FieldErrors, Result};
