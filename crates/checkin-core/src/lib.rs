//! Core types and trait definitions for the Checkin attendance tracker.
//!
//! This crate is free of HTTP, database and cache client dependencies. The
//! admission controller, the rotating token issuer and the punctuality engine
//! live here and talk to the outside world only through the traits in
//! [`store`], [`cache`] and [`media`].

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod admission;
pub mod cache;
pub mod checkin;
pub mod error;
pub mod issuer;
pub mod media;
pub mod punctuality;
pub mod schedule;
pub mod store;
pub mod volunteer;

pub use error::{Error, Result};
