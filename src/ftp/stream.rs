//! Streamed downloads

use std::io::{self, Read};

use tracing::{debug, warn};

use super::error::FtpError;
use super::transport::Transport;

/// Download stream returned by
/// [`FtpSession::get_file_stream`](super::session::FtpSession::get_file_stream).
///
/// Closing the stream closes the data connection and then reads the final
/// transfer reply, which the control connection needs before it accepts
/// another command. The stream holds the session's transport mutably, so no
/// other command can be issued while it is open. Dropping an unclosed stream
/// closes it and logs any failure.
pub struct RemoteFileStream<'a, T: Transport + ?Sized> {
    name: String,
    inner: Option<Box<dyn Read + Send>>,
    transport: &'a mut T,
    completed: bool,
}

impl<'a, T: Transport + ?Sized> RemoteFileStream<'a, T> {
    pub(crate) fn new(name: &str, inner: Box<dyn Read + Send>, transport: &'a mut T) -> Self {
        Self {
            name: name.to_string(),
            inner: Some(inner),
            transport,
            completed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the data stream and complete the transfer.
    ///
    /// Returns whether the server confirmed the transfer.
    pub fn close(mut self) -> Result<bool, FtpError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<bool, FtpError> {
        if self.completed {
            return Ok(true);
        }
        self.completed = true;
        drop(self.inner.take());
        let confirmed = self.transport.complete_pending_command()?;
        debug!(
            "Completed streamed download of {} (confirmed: {})",
            self.name, confirmed
        );
        Ok(confirmed)
    }
}

impl<T: Transport + ?Sized> Read for RemoteFileStream<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "download stream already closed",
            )),
        }
    }
}

impl<T: Transport + ?Sized> Drop for RemoteFileStream<'_, T> {
    fn drop(&mut self) {
        if !self.completed {
            if let Err(e) = self.finish() {
                warn!("Failed to complete streamed download of {}: {}", self.name, e);
            }
        }
    }
}
