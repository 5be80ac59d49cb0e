//! Domain logic for The Best Again ratings catalog.
//!
//! This crate has no I/O and no internal dependencies so it can be shared by
//! the row-store layer, the HTTP server, and any future tooling.

pub mod error;
pub mod html;
pub mod icon;
pub mod listing;
pub mod marker;
pub mod rating;
pub mod spotlight;
pub mod types;
pub mod vote;
