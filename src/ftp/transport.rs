//! Transport abstraction
//!
//! The FTP wire protocol lives behind [`Transport`]. Sessions and the client
//! only speak to this trait; [`SuppaTransport`](super::suppa::SuppaTransport)
//! is the production implementation.
//!
//! Methods that map to a single FTP command return `Ok(false)` when the
//! server answers with a negative reply and reserve `Err` for I/O and
//! protocol failures, so callers can tell "refused" apart from "broken".

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::progress::ProgressListener;
use super::reply::ReplyCode;
use super::types::constants::DEFAULT_BUFFER_SIZE;
use super::types::{RemoteEntry, TransferMode};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FTP protocol error: {0}")]
    Protocol(String),

    #[error("Not connected")]
    NotConnected,
}

/// Settings applied to a transport before and after connecting
#[derive(Clone)]
pub struct TransportSettings {
    /// Socket connect/read/write timeout
    pub socket_timeout: Duration,
    /// Buffer size for data transfers
    pub buffer_size: usize,
    /// Data transfer mode
    pub transfer_mode: TransferMode,
    /// Optional listener notified while data is transferred
    pub progress_listener: Option<Arc<dyn ProgressListener>>,
}

impl TransportSettings {
    pub fn new(socket_timeout: Duration) -> Self {
        Self {
            socket_timeout,
            buffer_size: DEFAULT_BUFFER_SIZE,
            transfer_mode: TransferMode::Block,
            progress_listener: None,
        }
    }

    pub fn with_progress_listener(mut self, listener: Option<Arc<dyn ProgressListener>>) -> Self {
        self.progress_listener = listener;
        self
    }
}

impl fmt::Debug for TransportSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportSettings")
            .field("socket_timeout", &self.socket_timeout)
            .field("buffer_size", &self.buffer_size)
            .field("transfer_mode", &self.transfer_mode)
            .field("progress_listener", &self.progress_listener.is_some())
            .finish()
    }
}

/// Pull-based source of listing pages
pub trait PageSource: Send {
    /// Whether another page may be available
    fn has_next(&mut self) -> bool;

    /// Take up to `max` entries
    fn next_page(&mut self, max: usize) -> Vec<RemoteEntry>;
}

/// FTP protocol collaborator
pub trait Transport: Send {
    /// Open the control connection
    fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError>;

    /// Code of the last reply received on the control connection
    fn reply_code(&self) -> ReplyCode;

    /// Text of the last reply received on the control connection
    fn reply_string(&self) -> String;

    /// Apply socket timeout, buffer size and transfer mode
    fn configure(&mut self, settings: &TransportSettings) -> Result<(), TransportError>;

    fn login(&mut self, username: &str, password: &str) -> Result<bool, TransportError>;

    /// Use passive data connections from now on
    fn enter_passive_mode(&mut self) -> Result<(), TransportError>;

    /// Switch to binary (image) file type
    fn set_binary_type(&mut self) -> Result<bool, TransportError>;

    fn make_directory(&mut self, path: &str) -> Result<bool, TransportError>;

    fn remove_directory(&mut self, path: &str) -> Result<bool, TransportError>;

    fn change_working_directory(&mut self, path: &str) -> Result<bool, TransportError>;

    fn store_file(&mut self, name: &str, input: &mut dyn Read) -> Result<bool, TransportError>;

    fn retrieve_file(&mut self, name: &str, output: &mut dyn Write)
        -> Result<bool, TransportError>;

    fn rename(&mut self, from: &str, to: &str) -> Result<bool, TransportError>;

    fn delete_file(&mut self, path: &str) -> Result<bool, TransportError>;

    /// List entries of `directory`, or of the working directory when `None`
    fn list_files(&mut self, directory: Option<&str>) -> Result<Vec<RemoteEntry>, TransportError>;

    fn list_directories(
        &mut self,
        directory: Option<&str>,
    ) -> Result<Vec<RemoteEntry>, TransportError> {
        Ok(self
            .list_files(directory)?
            .into_iter()
            .filter(RemoteEntry::is_directory)
            .collect())
    }

    /// Start a listing that is consumed page by page
    fn initiate_list_parsing(
        &mut self,
        directory: Option<&str>,
    ) -> Result<Box<dyn PageSource>, TransportError>;

    /// Open a download data stream. `None` means the server refused it.
    ///
    /// After the stream is closed, [`complete_pending_command`](Self::complete_pending_command)
    /// must be called before the control connection accepts new commands.
    fn retrieve_file_stream(
        &mut self,
        name: &str,
    ) -> Result<Option<Box<dyn Read + Send>>, TransportError>;

    /// Read the final reply of a streamed transfer
    fn complete_pending_command(&mut self) -> Result<bool, TransportError>;

    fn is_connected(&self) -> bool;

    fn logout(&mut self) -> Result<bool, TransportError>;

    fn disconnect(&mut self) -> Result<(), TransportError>;
}

/// Factory for unconnected transports
pub trait Connector {
    type Transport: Transport;

    fn create(&self, settings: &TransportSettings) -> Self::Transport;
}
