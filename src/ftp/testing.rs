//! In-memory transport for unit tests

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::progress::copy_with_progress;
use super::reply::ReplyCode;
use super::transport::{Connector, PageSource, Transport, TransportError, TransportSettings};
use super::types::RemoteEntry;

/// Scripted server behaviour plus a log of every transport call
#[derive(Debug)]
pub struct MockState {
    pub calls: Vec<String>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub directories: BTreeSet<String>,
    pub connected: bool,
    pub reply: ReplyCode,
    pub connect_reply: ReplyCode,
    pub connect_io_error: bool,
    pub password: String,
    pub passive_reply: ReplyCode,
    pub binary_ok: bool,
    pub stream_reply: ReplyCode,
    pub logout_error: bool,
    pub disconnect_error: bool,
    /// Transport method that fails with an I/O error
    pub failing_call: Option<String>,
    pub settings: Option<TransportSettings>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            files: BTreeMap::new(),
            directories: BTreeSet::new(),
            connected: false,
            reply: ReplyCode::default(),
            connect_reply: ReplyCode::SERVICE_READY,
            connect_io_error: false,
            password: "secret".to_string(),
            passive_reply: ReplyCode::LOGGED_IN,
            binary_ok: true,
            stream_reply: ReplyCode::FILE_STATUS_OK,
            logout_error: false,
            disconnect_error: false,
            failing_call: None,
            settings: None,
        }
    }
}

impl MockState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

pub type SharedState = Arc<Mutex<MockState>>;

pub fn shared_state() -> SharedState {
    Arc::new(Mutex::new(MockState::default()))
}

#[derive(Clone)]
pub struct MockConnector {
    pub state: SharedState,
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn create(&self, settings: &TransportSettings) -> MockTransport {
        self.state.lock().settings = Some(settings.clone());
        MockTransport {
            state: self.state.clone(),
            settings: settings.clone(),
        }
    }
}

pub struct MockTransport {
    state: SharedState,
    settings: TransportSettings,
}

impl MockTransport {
    /// Log the call and fail if it is scripted to
    fn enter(&self, call: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        if state.failing_call.as_deref() == Some(call) {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} broke", call),
            )));
        }
        if call != "connect" && !state.connected {
            return Err(TransportError::NotConnected);
        }
        Ok(())
    }

    fn reply(&self, ok: bool) -> bool {
        self.state.lock().reply = if ok {
            ReplyCode::FILE_ACTION_OK
        } else {
            ReplyCode::FILE_UNAVAILABLE
        };
        ok
    }

    fn entries(&self) -> Vec<RemoteEntry> {
        let state = self.state.lock();
        let dirs = state.directories.iter().map(RemoteEntry::directory);
        let files = state
            .files
            .iter()
            .map(|(name, data)| RemoteEntry::file(name.clone(), data.len() as u64));
        dirs.chain(files).collect()
    }
}

/// Page source over pre-built entries
pub struct EntryPages(pub VecDeque<RemoteEntry>);

impl PageSource for EntryPages {
    fn has_next(&mut self) -> bool {
        !self.0.is_empty()
    }

    fn next_page(&mut self, max: usize) -> Vec<RemoteEntry> {
        let take = max.min(self.0.len());
        self.0.drain(..take).collect()
    }
}

/// Download stream that records when it is closed
struct TrackedReader {
    data: Cursor<Vec<u8>>,
    state: SharedState,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.state.lock().calls.push("stream_closed".to_string());
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _host: &str, _port: u16) -> Result<(), TransportError> {
        self.enter("connect")?;
        let mut state = self.state.lock();
        if state.connect_io_error {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        state.connected = true;
        state.reply = state.connect_reply;
        Ok(())
    }

    fn reply_code(&self) -> ReplyCode {
        self.state.lock().reply
    }

    fn reply_string(&self) -> String {
        format!("{} mock reply", self.state.lock().reply)
    }

    fn configure(&mut self, _settings: &TransportSettings) -> Result<(), TransportError> {
        self.enter("configure")
    }

    fn login(&mut self, _username: &str, password: &str) -> Result<bool, TransportError> {
        self.enter("login")?;
        let mut state = self.state.lock();
        let ok = state.password == password;
        state.reply = if ok {
            ReplyCode::LOGGED_IN
        } else {
            ReplyCode::NOT_LOGGED_IN
        };
        Ok(ok)
    }

    fn enter_passive_mode(&mut self) -> Result<(), TransportError> {
        self.enter("enter_passive_mode")?;
        let mut state = self.state.lock();
        state.reply = state.passive_reply;
        Ok(())
    }

    fn set_binary_type(&mut self) -> Result<bool, TransportError> {
        self.enter("set_binary_type")?;
        Ok(self.state.lock().binary_ok)
    }

    fn make_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        self.enter("make_directory")?;
        let created = self.state.lock().directories.insert(path.to_string());
        Ok(self.reply(created))
    }

    fn remove_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        self.enter("remove_directory")?;
        let removed = self.state.lock().directories.remove(path);
        Ok(self.reply(removed))
    }

    fn change_working_directory(&mut self, path: &str) -> Result<bool, TransportError> {
        self.enter("change_working_directory")?;
        let exists = path == "/" || self.state.lock().directories.contains(path);
        Ok(self.reply(exists))
    }

    fn store_file(&mut self, name: &str, input: &mut dyn Read) -> Result<bool, TransportError> {
        self.enter("store_file")?;
        let mut data = Vec::new();
        copy_with_progress(
            input,
            &mut data,
            self.settings.buffer_size,
            self.settings.progress_listener.as_deref(),
            None,
        )?;
        self.state.lock().files.insert(name.to_string(), data);
        Ok(self.reply(true))
    }

    fn retrieve_file(
        &mut self,
        name: &str,
        output: &mut dyn Write,
    ) -> Result<bool, TransportError> {
        self.enter("retrieve_file")?;
        let data = self.state.lock().files.get(name).cloned();
        let Some(data) = data else {
            return Ok(self.reply(false));
        };
        let size = data.len() as u64;
        copy_with_progress(
            &mut data.as_slice(),
            output,
            self.settings.buffer_size,
            self.settings.progress_listener.as_deref(),
            Some(size),
        )?;
        Ok(self.reply(true))
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<bool, TransportError> {
        self.enter("rename")?;
        let mut state = self.state.lock();
        let Some(data) = state.files.remove(from) else {
            drop(state);
            return Ok(self.reply(false));
        };
        state.files.insert(to.to_string(), data);
        drop(state);
        Ok(self.reply(true))
    }

    fn delete_file(&mut self, path: &str) -> Result<bool, TransportError> {
        self.enter("delete_file")?;
        let removed = self.state.lock().files.remove(path).is_some();
        Ok(self.reply(removed))
    }

    fn list_files(&mut self, _directory: Option<&str>) -> Result<Vec<RemoteEntry>, TransportError> {
        self.enter("list_files")?;
        Ok(self.entries())
    }

    fn initiate_list_parsing(
        &mut self,
        _directory: Option<&str>,
    ) -> Result<Box<dyn PageSource>, TransportError> {
        self.enter("initiate_list_parsing")?;
        Ok(Box::new(EntryPages(self.entries().into())))
    }

    fn retrieve_file_stream(
        &mut self,
        name: &str,
    ) -> Result<Option<Box<dyn Read + Send>>, TransportError> {
        self.enter("retrieve_file_stream")?;
        let mut state = self.state.lock();
        let Some(data) = state.files.get(name).cloned() else {
            state.reply = ReplyCode::FILE_UNAVAILABLE;
            return Ok(None);
        };
        state.reply = state.stream_reply;
        Ok(Some(Box::new(TrackedReader {
            data: Cursor::new(data),
            state: self.state.clone(),
        })))
    }

    fn complete_pending_command(&mut self) -> Result<bool, TransportError> {
        self.enter("complete_pending_command")?;
        self.state.lock().reply = ReplyCode::CLOSING_DATA;
        Ok(true)
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn logout(&mut self) -> Result<bool, TransportError> {
        self.enter("logout")?;
        if self.state.lock().logout_error {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "logout failed",
            )));
        }
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        self.enter("disconnect")?;
        let mut state = self.state.lock();
        state.connected = false;
        if state.disconnect_error {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "disconnect failed",
            )));
        }
        Ok(())
    }
}
