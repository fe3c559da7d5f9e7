//! Process-local state shared across requests.
//!
//! Both stores live in memory only: they reset on restart and are not shared
//! between instances.

pub mod cache;
pub mod rate_limit;
