//! Sandbox runtime environment
//!
//! The hosting sandbox keeps per-request attributes, most importantly the
//! deadline applied to every outbound call. Instead of an implicit global
//! lookup, the environment is an explicit value threaded through the FTP
//! client and its sessions.

mod deadline;
mod environment;

pub use deadline::DeadlineGuard;
pub use environment::{Environment, API_DEADLINE_KEY};
