//! HTTP API layer for backtalk.
//!
//! This crate provides the REST surface over the core services:
//!
//! - **Endpoints**: comments, moderation, and session routes
//! - **Extractors**: authenticated and optional-actor extractors
//! - **Middleware**: bearer-token session resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
