//! FTP Client
//!
//! Owns the connection configuration, performs the connection handshake and
//! hands an authenticated [`FtpSession`] to a caller operation. The session
//! is always released afterwards.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::config::ConnectionConfig;
use super::error::FtpError;
use super::progress::ProgressListener;
use super::session::FtpSession;
use super::suppa::SuppaConnector;
use super::transport::{Connector, Transport, TransportSettings};
use crate::sandbox::{DeadlineGuard, Environment};

/// FTP client for one configured server
pub struct FtpClient<C: Connector = SuppaConnector> {
    config: ConnectionConfig,
    connector: C,
    environment: Option<Environment>,
    progress_listener: Option<Arc<dyn ProgressListener>>,
}

impl FtpClient {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connector: SuppaConnector,
            environment: None,
            progress_listener: None,
        }
    }

    /// Client for `host` on the default port and timeout
    pub fn with_credentials(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(ConnectionConfig::new(host, username, password))
    }
}

impl<C: Connector> FtpClient<C> {
    /// Use another transport factory
    pub fn with_connector<D: Connector>(self, connector: D) -> FtpClient<D> {
        FtpClient {
            config: self.config,
            connector,
            environment: self.environment,
            progress_listener: self.progress_listener,
        }
    }

    /// Sandbox environment whose deadline attribute is extended during calls
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_progress_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.progress_listener = Some(listener);
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Connect, run `operation` against the session, then release it.
    ///
    /// The operation's result is returned unchanged. The session is released
    /// whether the operation succeeds or fails.
    pub fn run<R, F>(&self, operation: F) -> Result<R, FtpError>
    where
        F: FnOnce(&mut FtpSession<C::Transport>) -> Result<R, FtpError>,
    {
        let mut session = self.prepare()?;
        let result = operation(&mut session);
        session.release();
        result
    }

    /// Connect, log in and configure passive binary transfers.
    ///
    /// The sandbox deadline is extended to the configured timeout for the
    /// duration of the handshake and restored afterwards. On failure the
    /// half-open connection is closed and the original error returned.
    pub fn prepare(&self) -> Result<FtpSession<C::Transport>, FtpError> {
        self.config.validate()?;

        let _deadline = DeadlineGuard::extend(self.environment.as_ref(), self.config.timeout());
        let start = Instant::now();

        let settings = TransportSettings::new(self.config.timeout())
            .with_progress_listener(self.progress_listener.clone());
        let mut transport = self.connector.create(&settings);

        match self.handshake(&mut transport, &settings) {
            Ok(()) => {
                info!(
                    "Took {}ms to establish an ftp connection to {}",
                    start.elapsed().as_millis(),
                    self.config.address()
                );
                Ok(FtpSession::new(transport, self.environment.clone()))
            }
            Err(e) => {
                warn!(
                    "Took {}ms to fail to establish an ftp connection to {}: {}",
                    start.elapsed().as_millis(),
                    self.config.address(),
                    e
                );
                abandon(&mut transport);
                Err(e)
            }
        }
    }

    fn handshake(
        &self,
        transport: &mut C::Transport,
        settings: &TransportSettings,
    ) -> Result<(), FtpError> {
        transport.connect(&self.config.host, self.config.port)?;
        if !transport.reply_code().is_positive_completion() {
            return Err(FtpError::ConnectionFailed {
                host: self.config.host.clone(),
                port: self.config.port,
            });
        }

        transport.configure(settings)?;

        if !transport.login(&self.config.username, &self.config.password)? {
            return Err(FtpError::AuthenticationFailed);
        }

        transport.enter_passive_mode()?;
        if !transport.reply_code().is_positive_completion() {
            return Err(FtpError::PassiveModeFailed);
        }

        if !transport.set_binary_type()? {
            return Err(FtpError::BinaryModeFailed);
        }
        Ok(())
    }
}

/// Best-effort teardown of a connection whose handshake failed
fn abandon<T: Transport>(transport: &mut T) {
    if !transport.is_connected() {
        return;
    }
    if let Err(e) = transport.logout() {
        warn!("Failed to log out after failed ftp handshake - ignoring: {}", e);
    }
    if let Err(e) = transport.disconnect() {
        warn!("Failed to disconnect after failed ftp handshake - ignoring: {}", e);
    }
}
