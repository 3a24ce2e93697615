//! Cache-first CRUD store for posts and their comments.
//!
//! Collections come from a read-only JSON API once, then live in a durable
//! local cache where they can be created, edited and deleted without any
//! server round-trip.

pub mod app;
pub mod blog;
pub mod cache;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod store;
