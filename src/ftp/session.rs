//! FTP Session
//!
//! Wraps one authenticated control connection. Every remote operation runs
//! through [`FtpSession::time_log_and_catch`], which extends the sandbox
//! deadline for the call, logs start and elapsed time, and wraps failures
//! into [`FtpError::OperationFailed`].
//!
//! Boolean results follow the server's reply: a refused command yields
//! `Ok(false)`, only transport failures become errors.

use std::io::{Read, Write};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::error::FtpError;
use super::listing::BatchListing;
use super::stream::RemoteFileStream;
use super::transport::{Transport, TransportError};
use super::types::constants::SESSION_DEADLINE;
use super::types::RemoteEntry;
use crate::sandbox::{DeadlineGuard, Environment};

/// Authenticated FTP session
pub struct FtpSession<T: Transport> {
    /// Session ID used in log lines
    id: String,
    transport: T,
    environment: Option<Environment>,
    released: bool,
}

impl<T: Transport> FtpSession<T> {
    pub(crate) fn new(transport: T, environment: Option<Environment>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        debug!("Opened ftp session {}", id);
        Self {
            id,
            transport,
            environment,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The prepared transport: logged in, passive, binary.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the prepared transport for raw commands
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Run one remote call with deadline extension, timing, logging and
    /// error wrapping.
    pub fn time_log_and_catch<R, F>(&mut self, label: &str, call: F) -> Result<R, FtpError>
    where
        F: FnOnce(&mut T) -> Result<R, FtpError>,
    {
        let start = Instant::now();
        let _deadline = DeadlineGuard::extend(self.environment.as_ref(), SESSION_DEADLINE);

        info!("Ftp {}", label);
        let result = if self.released {
            Err(FtpError::from(TransportError::NotConnected))
        } else {
            call(&mut self.transport)
        };
        let elapsed = start.elapsed().as_millis();

        match result {
            Ok(value) => {
                info!("Ftp {} succeeded in {}ms", label, elapsed);
                Ok(value)
            }
            Err(e) => {
                warn!("Ftp {} failed in {}ms: {}", label, elapsed, e);
                Err(FtpError::operation(label, e))
            }
        }
    }

    pub fn create_directory(&mut self, path: &str) -> Result<bool, FtpError> {
        self.time_log_and_catch("Create directory", |t| Ok(t.make_directory(path)?))
    }

    pub fn delete_directory(&mut self, path: &str) -> Result<bool, FtpError> {
        self.time_log_and_catch("Delete directory", |t| Ok(t.remove_directory(path)?))
    }

    pub fn change_working_directory(&mut self, path: &str) -> Result<bool, FtpError> {
        self.time_log_and_catch("Change working directory", |t| {
            Ok(t.change_working_directory(path)?)
        })
    }

    /// Upload `input` to the remote file `name`
    pub fn put_file<R: Read>(&mut self, name: &str, input: &mut R) -> Result<bool, FtpError> {
        self.time_log_and_catch("Put file", |t| Ok(t.store_file(name, input)?))
    }

    /// Download the remote file `name` into `output`
    pub fn get_file<W: Write>(&mut self, name: &str, output: &mut W) -> Result<bool, FtpError> {
        let label = format!("Get file {}", name);
        self.time_log_and_catch(&label, |t| Ok(t.retrieve_file(name, output)?))
    }

    /// Download a listed entry. Absent entries and non-files return `false`
    /// without touching the connection.
    pub fn get_entry<W: Write>(
        &mut self,
        entry: Option<&RemoteEntry>,
        output: &mut W,
    ) -> Result<bool, FtpError> {
        match entry {
            Some(entry) if entry.is_file() => self.get_file(&entry.name, output),
            _ => Ok(false),
        }
    }

    pub fn rename_file(&mut self, from: &str, to: &str) -> Result<bool, FtpError> {
        self.time_log_and_catch("Rename file", |t| Ok(t.rename(from, to)?))
    }

    pub fn delete_file(&mut self, path: &str) -> Result<bool, FtpError> {
        self.time_log_and_catch("Delete file", |t| Ok(t.delete_file(path)?))
    }

    /// Directories in the working directory
    pub fn list_directories(&mut self) -> Result<Vec<RemoteEntry>, FtpError> {
        self.time_log_and_catch("List directories", |t| Ok(t.list_directories(None)?))
    }

    pub fn list_directories_in(&mut self, directory: &str) -> Result<Vec<RemoteEntry>, FtpError> {
        self.time_log_and_catch("List directories", |t| {
            Ok(t.list_directories(Some(directory))?)
        })
    }

    /// All entries in the working directory
    pub fn list_files(&mut self) -> Result<Vec<RemoteEntry>, FtpError> {
        self.time_log_and_catch("List files", |t| Ok(t.list_files(None)?))
    }

    pub fn list_files_in(&mut self, directory: &str) -> Result<Vec<RemoteEntry>, FtpError> {
        self.time_log_and_catch("List files", |t| Ok(t.list_files(Some(directory))?))
    }

    /// List `directory` (files and directories) in batches of at most
    /// `batch_size` entries. The returned cursor is single-pass.
    pub fn list_batch(
        &mut self,
        directory: &str,
        batch_size: usize,
    ) -> Result<BatchListing, FtpError> {
        let source = self.time_log_and_catch("List files in batch", |t| {
            Ok(t.initiate_list_parsing(Some(directory))?)
        })?;
        Ok(BatchListing::new(source, batch_size))
    }

    /// Open a streamed download of `name`.
    ///
    /// The returned stream borrows the session until it is closed or dropped.
    pub fn get_file_stream(&mut self, name: &str) -> Result<RemoteFileStream<'_, T>, FtpError> {
        let label = format!("Get file stream {}", name);
        let stream = self.time_log_and_catch(&label, |t| {
            let stream = t.retrieve_file_stream(name)?;
            let reply = t.reply_code();
            match stream {
                Some(stream) if reply.is_positive_preliminary() || reply.is_positive_completion() => {
                    Ok(stream)
                }
                _ => Err(FtpError::StreamOpenFailed(t.reply_string())),
            }
        })?;
        Ok(RemoteFileStream::new(name, stream, &mut self.transport))
    }

    /// Disconnect the control connection. Safe to call more than once;
    /// disconnect failures are logged and ignored.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if self.transport.is_connected() {
            if let Err(e) = self.transport.disconnect() {
                warn!("Failed to disconnect ftp session {} - ignoring: {}", self.id, e);
            }
        }
        debug!("Released ftp session {}", self.id);
    }
}

impl<T: Transport> Drop for FtpSession<T> {
    fn drop(&mut self) {
        self.release();
    }
}
