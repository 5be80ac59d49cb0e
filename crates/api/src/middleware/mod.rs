//! Request extractors.
//!
//! - [`auth::AuthUser`] -- The signed-in user, required.
//! - [`auth::MaybeUser`] -- The signed-in user, if any (pages render for guests too).

pub mod auth;
