//! Domain types for searches, jobs, posts and configuration.

pub mod config;
pub mod enums;
pub mod job;
pub mod post;
pub mod search;
