//! The Best Again HTTP server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, page
//! rendering) so integration tests and the binary entrypoint can both use
//! them.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geocode;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod views;
