//! HTTP API layer for agora.
//!
//! This crate provides the REST surface:
//!
//! - **Endpoints**: auth, users, polls, voting and results
//! - **Extractors**: authenticated user, pagination
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
