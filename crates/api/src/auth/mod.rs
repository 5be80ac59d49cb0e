//! Access token verification.
//!
//! Tokens are issued by the hosted auth service; this server only checks
//! them. See [`jwt`].

pub mod jwt;
