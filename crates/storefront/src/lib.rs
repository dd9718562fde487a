//! Medusa Storefront library.
//!
//! Server-rendered product pages and checkout payment UI on top of the Medusa
//! Store API. The binary in `main.rs` wires this library to a listener; the
//! integration tests drive the same router with `tower::ServiceExt::oneshot`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commerce;
pub mod config;
pub mod error;
pub mod filters;
pub mod loaders;
pub mod middleware;
pub mod payment;
pub mod routes;
pub mod state;
