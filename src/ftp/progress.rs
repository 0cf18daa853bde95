//! Transfer progress reporting
//!
//! A [`ProgressListener`] can be injected into the client and is called for
//! every chunk moved over a data connection.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Receives transfer progress callbacks
pub trait ProgressListener: Send + Sync {
    /// `total_bytes` transferred so far, `chunk_bytes` in the latest chunk,
    /// and the full stream size when known.
    fn bytes_transferred(&self, total_bytes: u64, chunk_bytes: usize, stream_size: Option<u64>);
}

impl<F> ProgressListener for F
where
    F: Fn(u64, usize, Option<u64>) + Send + Sync,
{
    fn bytes_transferred(&self, total_bytes: u64, chunk_bytes: usize, stream_size: Option<u64>) {
        self(total_bytes, chunk_bytes, stream_size)
    }
}

/// Listener that logs once per completed megabyte (10^6 bytes)
#[derive(Debug, Default)]
pub struct MegabyteTicker {
    megs_total: AtomicU64,
}

impl MegabyteTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Megabytes reported so far
    pub fn megabytes(&self) -> u64 {
        self.megs_total.load(Ordering::Relaxed)
    }
}

impl ProgressListener for MegabyteTicker {
    fn bytes_transferred(&self, total_bytes: u64, _chunk_bytes: usize, stream_size: Option<u64>) {
        let megs = total_bytes / 1_000_000;
        let previous = self.megs_total.swap(megs, Ordering::Relaxed);
        if megs > previous {
            match stream_size {
                Some(size) => info!("Transferred {}MB of {} bytes", megs, size),
                None => info!("Transferred {}MB", megs),
            }
        }
    }
}

/// Reader adapter that reports every read to a listener
pub struct ProgressReader<'a, R: ?Sized> {
    inner: &'a mut R,
    listener: Option<&'a dyn ProgressListener>,
    stream_size: Option<u64>,
    total: u64,
}

impl<'a, R: Read + ?Sized> ProgressReader<'a, R> {
    pub fn new(
        inner: &'a mut R,
        listener: Option<&'a dyn ProgressListener>,
        stream_size: Option<u64>,
    ) -> Self {
        Self {
            inner,
            listener,
            stream_size,
            total: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

impl<R: Read + ?Sized> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.total += n as u64;
            if let Some(listener) = self.listener {
                listener.bytes_transferred(self.total, n, self.stream_size);
            }
        }
        Ok(n)
    }
}

/// Copy `reader` into `writer` using a `buffer_size` buffer, notifying the
/// listener after each chunk. Returns the number of bytes copied.
pub fn copy_with_progress(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    buffer_size: usize,
    listener: Option<&dyn ProgressListener>,
    stream_size: Option<u64>,
) -> io::Result<u64> {
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        total += n as u64;
        if let Some(listener) = listener {
            listener.bytes_transferred(total, n, stream_size);
        }
    }
    writer.flush()?;
    Ok(total)
}
