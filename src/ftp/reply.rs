//! FTP reply code classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric FTP reply code (RFC 959 §4.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ReplyCode(pub u32);

/// First-digit class of a reply code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// 1xx - action started, expect another reply
    PositivePreliminary,
    /// 2xx - action completed
    PositiveCompletion,
    /// 3xx - command accepted, more information needed
    PositiveIntermediate,
    /// 4xx - temporary failure, may be retried
    TransientNegative,
    /// 5xx - permanent failure
    PermanentNegative,
    /// No reply received yet, or an out-of-range value
    Unknown,
}

impl ReplyCode {
    pub const SERVICE_READY: ReplyCode = ReplyCode(220);
    pub const FILE_STATUS_OK: ReplyCode = ReplyCode(150);
    pub const COMMAND_OK: ReplyCode = ReplyCode(200);
    pub const CLOSING_CONTROL: ReplyCode = ReplyCode(221);
    pub const CLOSING_DATA: ReplyCode = ReplyCode(226);
    pub const LOGGED_IN: ReplyCode = ReplyCode(230);
    pub const FILE_ACTION_OK: ReplyCode = ReplyCode(250);
    pub const PATH_CREATED: ReplyCode = ReplyCode(257);
    pub const NOT_AVAILABLE: ReplyCode = ReplyCode(421);
    pub const NOT_LOGGED_IN: ReplyCode = ReplyCode(530);
    pub const FILE_UNAVAILABLE: ReplyCode = ReplyCode(550);

    pub fn class(&self) -> ReplyClass {
        match self.0 {
            100..=199 => ReplyClass::PositivePreliminary,
            200..=299 => ReplyClass::PositiveCompletion,
            300..=399 => ReplyClass::PositiveIntermediate,
            400..=499 => ReplyClass::TransientNegative,
            500..=599 => ReplyClass::PermanentNegative,
            _ => ReplyClass::Unknown,
        }
    }

    pub fn is_positive_preliminary(&self) -> bool {
        self.class() == ReplyClass::PositivePreliminary
    }

    pub fn is_positive_completion(&self) -> bool {
        self.class() == ReplyClass::PositiveCompletion
    }

    pub fn is_positive_intermediate(&self) -> bool {
        self.class() == ReplyClass::PositiveIntermediate
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self.class(),
            ReplyClass::TransientNegative | ReplyClass::PermanentNegative
        )
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
