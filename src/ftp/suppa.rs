//! Transport implementation using suppaftp

use std::io::{Read, Write};
use std::net::{Shutdown, ToSocketAddrs};

use suppaftp::types::{FileType, Mode};
use suppaftp::{FtpError as SuppaError, FtpResult, FtpStream};
use tracing::{debug, info};

use super::listing::ListParseEngine;
use super::progress::{copy_with_progress, ProgressReader};
use super::reply::ReplyCode;
use super::transport::{Connector, PageSource, Transport, TransportError, TransportSettings};
use super::types::{RemoteEntry, TransferMode};

/// Creates [`SuppaTransport`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppaConnector;

impl Connector for SuppaConnector {
    type Transport = SuppaTransport;

    fn create(&self, settings: &TransportSettings) -> SuppaTransport {
        SuppaTransport::new(settings.clone())
    }
}

/// Plain FTP transport over `suppaftp::FtpStream`
pub struct SuppaTransport {
    stream: Option<FtpStream>,
    settings: TransportSettings,
    reply: ReplyCode,
    reply_text: String,
}

impl SuppaTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            stream: None,
            settings,
            reply: ReplyCode::default(),
            reply_text: String::new(),
        }
    }

    /// The underlying suppaftp stream, for commands not covered by [`Transport`]
    pub fn stream_mut(&mut self) -> Result<&mut FtpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }

    fn record(&mut self, code: ReplyCode, text: impl Into<String>) {
        self.reply = code;
        self.reply_text = text.into();
    }

    /// Turn a suppaftp result into "value or negative reply".
    ///
    /// Negative server replies become `Ok(None)` with the reply recorded;
    /// connection failures become `Err`.
    fn settle<V>(&mut self, result: FtpResult<V>, success: ReplyCode) -> Result<Option<V>, TransportError> {
        match result {
            Ok(value) => {
                self.record(success, String::new());
                Ok(Some(value))
            }
            Err(SuppaError::UnexpectedResponse(response)) => {
                let text = String::from_utf8_lossy(&response.body).trim_end().to_string();
                self.record(ReplyCode(response.status.code()), text);
                Ok(None)
            }
            Err(SuppaError::ConnectionError(e)) => Err(TransportError::Io(e)),
            Err(other) => Err(TransportError::Protocol(other.to_string())),
        }
    }

    fn list_lines(&mut self, directory: Option<&str>) -> Result<Vec<String>, TransportError> {
        let result = self.stream_mut()?.list(directory);
        Ok(self
            .settle(result, ReplyCode::CLOSING_DATA)?
            .unwrap_or_default())
    }
}

impl Transport for SuppaTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Protocol(format!("No address found for {}:{}", host, port)))?;

        debug!("Connecting to FTP server at {}", addr);

        match FtpStream::connect_timeout(addr, self.settings.socket_timeout) {
            Ok(stream) => {
                let welcome = stream.get_welcome_msg().unwrap_or_default().to_string();
                self.record(ReplyCode::SERVICE_READY, welcome);
                self.stream = Some(stream);
                Ok(())
            }
            // Socket connected but the server did not greet with 220
            Err(SuppaError::UnexpectedResponse(response)) => {
                let text = String::from_utf8_lossy(&response.body).trim_end().to_string();
                self.record(ReplyCode(response.status.code()), text);
                Ok(())
            }
            Err(SuppaError::ConnectionError(e)) => Err(TransportError::Io(e)),
            Err(other) => Err(TransportError::Protocol(other.to_string())),
        }
    }

    fn reply_code(&self) -> ReplyCode {
        self.reply
    }

    fn reply_string(&self) -> String {
        format!("{} {}", self.reply, self.reply_text).trim_end().to_string()
    }

    fn configure(&mut self, settings: &TransportSettings) -> Result<(), TransportError> {
        {
            let tcp = self.stream_mut()?.get_ref();
            tcp.set_read_timeout(Some(settings.socket_timeout))?;
            tcp.set_write_timeout(Some(settings.socket_timeout))?;
        }

        // suppaftp frames data connections in stream mode only
        if settings.transfer_mode != TransferMode::Stream {
            info!(
                "Transfer mode {:?} requested; data connections use stream mode",
                settings.transfer_mode
            );
        }

        self.settings = settings.clone();
        Ok(())
    }

    fn login(&mut self, username: &str, password: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.login(username, password);
        Ok(self.settle(result, ReplyCode::LOGGED_IN)?.is_some())
    }

    fn enter_passive_mode(&mut self) -> Result<(), TransportError> {
        // PASV is issued per data connection; nothing is sent here
        self.stream_mut()?.set_mode(Mode::Passive);
        Ok(())
    }

    fn set_binary_type(&mut self) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.transfer_type(FileType::Binary);
        Ok(self.settle(result, ReplyCode::COMMAND_OK)?.is_some())
    }

    fn make_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.mkdir(path);
        Ok(self.settle(result, ReplyCode::PATH_CREATED)?.is_some())
    }

    fn remove_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.rmdir(path);
        Ok(self.settle(result, ReplyCode::FILE_ACTION_OK)?.is_some())
    }

    fn change_working_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.cwd(path);
        Ok(self.settle(result, ReplyCode::FILE_ACTION_OK)?.is_some())
    }

    fn store_file(&mut self, name: &str, input: &mut dyn Read) -> Result<bool, TransportError> {
        let listener = self.settings.progress_listener.clone();
        let result = {
            let mut reader = ProgressReader::new(input, listener.as_deref(), None);
            self.stream_mut()?.put_file(name, &mut reader)
        };
        match self.settle(result, ReplyCode::CLOSING_DATA)? {
            Some(bytes) => {
                debug!("Stored {} bytes to {}", bytes, name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn retrieve_file(
        &mut self,
        name: &str,
        output: &mut dyn Write,
    ) -> Result<bool, TransportError> {
        let listener = self.settings.progress_listener.clone();
        let buffer_size = self.settings.buffer_size;
        let result = self.stream_mut()?.retr(name, |reader| {
            copy_with_progress(reader, &mut *output, buffer_size, listener.as_deref(), None)
                .map_err(SuppaError::ConnectionError)
        });
        match self.settle(result, ReplyCode::CLOSING_DATA)? {
            Some(bytes) => {
                debug!("Retrieved {} bytes from {}", bytes, name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.rename(from, to);
        Ok(self.settle(result, ReplyCode::FILE_ACTION_OK)?.is_some())
    }

    fn delete_file(&mut self, path: &str) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.rm(path);
        Ok(self.settle(result, ReplyCode::FILE_ACTION_OK)?.is_some())
    }

    fn list_files(&mut self, directory: Option<&str>) -> Result<Vec<RemoteEntry>, TransportError> {
        Ok(self
            .list_lines(directory)?
            .iter()
            .filter_map(|line| RemoteEntry::parse_list_line(line))
            .collect())
    }

    fn initiate_list_parsing(
        &mut self,
        directory: Option<&str>,
    ) -> Result<Box<dyn PageSource>, TransportError> {
        let lines = self.list_lines(directory)?;
        Ok(Box::new(ListParseEngine::new(lines)))
    }

    fn retrieve_file_stream(
        &mut self,
        name: &str,
    ) -> Result<Option<Box<dyn Read + Send>>, TransportError> {
        let result = self.stream_mut()?.retr_as_stream(name);
        Ok(self
            .settle(result, ReplyCode::FILE_STATUS_OK)?
            .map(|stream| Box::new(stream) as Box<dyn Read + Send>))
    }

    fn complete_pending_command(&mut self) -> Result<bool, TransportError> {
        // The data stream has already been dropped by the caller
        let result = self.stream_mut()?.finalize_retr_stream(std::io::empty());
        Ok(self.settle(result, ReplyCode::CLOSING_DATA)?.is_some())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn logout(&mut self) -> Result<bool, TransportError> {
        let result = self.stream_mut()?.quit();
        Ok(self.settle(result, ReplyCode::CLOSING_CONTROL)?.is_some())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        match stream.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}
