//! Paged directory listings

use std::collections::VecDeque;
use std::iter::FusedIterator;

use tracing::debug;

use super::transport::PageSource;
use super::types::RemoteEntry;

/// Lazily parses raw `LIST` lines into entries, one page at a time.
///
/// The server reply is held as raw lines; entries are only materialised as
/// pages are requested. Lines that do not describe an entry are skipped.
pub struct ListParseEngine {
    lines: VecDeque<String>,
}

impl ListParseEngine {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Raw lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl PageSource for ListParseEngine {
    fn has_next(&mut self) -> bool {
        !self.lines.is_empty()
    }

    fn next_page(&mut self, max: usize) -> Vec<RemoteEntry> {
        let mut page = Vec::with_capacity(max.min(self.lines.len()));
        while page.len() < max {
            let Some(line) = self.lines.pop_front() else {
                break;
            };
            match RemoteEntry::parse_list_line(&line) {
                Some(entry) => page.push(entry),
                None => debug!("Skipping unparseable listing line: {}", line),
            }
        }
        page
    }
}

/// Single-pass cursor over a paged listing.
///
/// Each batch holds at most `batch_size` entries. Once the source reports
/// no more entries the cursor is exhausted and stays exhausted.
pub struct BatchListing {
    source: Box<dyn PageSource>,
    batch_size: usize,
    exhausted: bool,
}

impl BatchListing {
    /// A `batch_size` of 0 is treated as 1.
    pub fn new(source: Box<dyn PageSource>, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
            exhausted: false,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Iterator for BatchListing {
    type Item = Vec<RemoteEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if !self.source.has_next() {
            self.exhausted = true;
            return None;
        }
        let batch = self.source.next_page(self.batch_size);
        if batch.is_empty() {
            self.exhausted = true;
            return None;
        }
        Some(batch)
    }
}

impl FusedIterator for BatchListing {}
