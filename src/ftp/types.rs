//! FTP data types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote filesystem entry returned by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Entry name as reported by the server (relative to the listed directory)
    pub name: String,
    /// Entry type
    pub entry_type: EntryType,
    /// Size in bytes
    pub size: u64,
    /// Last modified time, when the listing format carries one
    pub modified: Option<DateTime<Utc>>,
}

impl RemoteEntry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::File,
            size,
            modified: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Directory,
            size: 0,
            modified: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// Parse one line of a `LIST` response (POSIX or DOS format).
    ///
    /// Returns `None` for lines that are not entries (e.g. `total 12`) and for
    /// the `.` / `..` pseudo entries.
    pub fn parse_list_line(line: &str) -> Option<Self> {
        let file = suppaftp::list::File::from_str(line.trim_end()).ok()?;
        let name = file.name().to_string();
        if name == "." || name == ".." {
            return None;
        }

        let entry_type = if file.is_directory() {
            EntryType::Directory
        } else if file.is_symlink() {
            EntryType::Symlink
        } else if file.is_file() {
            EntryType::File
        } else {
            EntryType::Unknown
        };

        Some(Self {
            name,
            entry_type,
            size: file.size() as u64,
            modified: Some(DateTime::<Utc>::from(file.modified())),
        })
    }
}

/// Entry type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// FTP data transfer mode (`MODE` command)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Stream,
    Block,
    Compressed,
}

impl TransferMode {
    /// Argument of the `MODE` command
    pub fn code(&self) -> char {
        match self {
            TransferMode::Stream => 'S',
            TransferMode::Block => 'B',
            TransferMode::Compressed => 'C',
        }
    }
}

/// Constants for FTP sessions
pub mod constants {
    use std::time::Duration;

    /// Default FTP control port
    pub const DEFAULT_PORT: u16 = 21;

    /// Default connection/socket timeout (60 s)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Transfer buffer size (4 KB)
    pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

    /// Deadline granted to the sandbox for each session operation
    pub const SESSION_DEADLINE: Duration = Duration::from_secs(60);
}
