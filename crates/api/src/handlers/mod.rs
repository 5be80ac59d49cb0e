//! Request handlers.
//!
//! JSON handlers return `{ "data": ... }` envelopes and map errors via
//! [`crate::error::AppError`]. [`pages`] renders the HTML pages and handles
//! their form posts.

pub mod brands;
pub mod categories;
pub mod geocode;
pub mod markers;
pub mod pages;
pub mod spotlight;
pub mod votes;
