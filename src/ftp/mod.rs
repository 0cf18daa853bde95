//! FTP client module
//!
//! Managed passive-mode FTP sessions: connect, authenticate, run an
//! operation against the session and always disconnect afterwards.

pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod progress;
pub mod reply;
pub mod session;
pub mod stream;
pub mod suppa;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::FtpClient;
pub use config::{ConfigError, ConnectionConfig};
pub use error::FtpError;
pub use listing::{BatchListing, ListParseEngine};
pub use progress::{copy_with_progress, MegabyteTicker, ProgressListener, ProgressReader};
pub use reply::{ReplyClass, ReplyCode};
pub use session::FtpSession;
pub use stream::RemoteFileStream;
pub use suppa::{SuppaConnector, SuppaTransport};
pub use transport::{Connector, PageSource, Transport, TransportError, TransportSettings};
pub use types::*;
