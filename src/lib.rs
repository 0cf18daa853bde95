//! Managed FTP sessions for sandboxed request runtimes.
//!
//! [`FtpClient`] connects within the sandbox deadline, hands an authenticated
//! [`FtpSession`] to a caller operation and guarantees the connection is torn
//! down afterwards.

pub mod ftp;
pub mod sandbox;

pub use ftp::{ConnectionConfig, FtpClient, FtpError, FtpSession, RemoteEntry};
pub use sandbox::{DeadlineGuard, Environment};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the default log subscriber (`RUST_LOG`, falling back to `info`).
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
