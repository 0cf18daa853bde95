//! FTP Error types

use thiserror::Error;

use super::config::ConfigError;
use super::transport::TransportError;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Connection failed: could not connect to {host}:{port}")]
    ConnectionFailed { host: String, port: u16 },

    #[error("Authentication failed: credentials refused")]
    AuthenticationFailed,

    #[error("Passive mode refused by server")]
    PassiveModeFailed,

    #[error("Binary transfer mode refused by server")]
    BinaryModeFailed,

    #[error("Transport error: {message}")]
    TransportIo {
        message: String,
        #[source]
        source: TransportError,
    },

    #[error("{label} failed: {message}")]
    OperationFailed {
        label: String,
        message: String,
        #[source]
        source: Box<FtpError>,
    },

    #[error("Failed to open download stream: {0}")]
    StreamOpenFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl FtpError {
    /// Wrap a failure raised inside a session operation
    pub fn operation(label: impl Into<String>, cause: FtpError) -> Self {
        FtpError::OperationFailed {
            label: label.into(),
            message: cause.detail(),
            source: Box::new(cause),
        }
    }

    /// The wrapped domain error of an `OperationFailed`
    pub fn cause(&self) -> Option<&FtpError> {
        match self {
            FtpError::OperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Message without the variant prefix, as carried into wrappers
    fn detail(&self) -> String {
        match self {
            FtpError::TransportIo { message, .. } => message.clone(),
            FtpError::OperationFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<TransportError> for FtpError {
    fn from(err: TransportError) -> Self {
        FtpError::TransportIo {
            message: err.to_string(),
            source: err,
        }
    }
}

// Hosts forward errors as plain strings
impl serde::Serialize for FtpError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
