//! TCP listener and accept loop
//!
//! Binds a reusable-address socket with a backlog of one and serves accepted
//! connections one at a time: the hardware sits behind exactly one
//! controller link, so a second client is not accepted until the current
//! session ends. Accept and receive both wait in bounded polls so a stop
//! request is observed promptly.

use crate::communication::capture::CapturePaths;
use crate::communication::session::{Session, SessionEnd};
use crate::communication::state::{BridgeState, SessionState};
use crate::firmware::grbl::DEFAULT_MAX_LINE_LEN;
use grblbridge_core::{
    BridgeObserver, Catalog, ConnectionError, Error, Language, MessageKey, Result, Severity,
};
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Runtime configuration of the bridge listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interface to bind, e.g. `0.0.0.0`
    pub host: String,
    /// TCP port, `0` picks an ephemeral port
    pub port: u16,
    /// Listen backlog
    pub backlog: u32,
    /// Upper bound on a single accept or receive wait
    pub poll_interval: Duration,
    /// Receive buffer size per read
    pub read_chunk_size: usize,
    /// Longest accepted line; longer lines are dropped
    pub max_line_len: usize,
    /// Program file and communication log
    pub capture: CapturePaths,
    /// Language of status messages
    pub language: Language,
}

impl BridgeConfig {
    /// `host:port` as handed to the resolver
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_capture(mut self, capture: CapturePaths) -> Self {
        self.capture = capture;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 23,
            backlog: 1,
            poll_interval: Duration::from_secs(1),
            read_chunk_size: 1024,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            capture: CapturePaths::default(),
            language: Language::default(),
        }
    }
}

enum Accepted {
    Connection(tokio::net::TcpStream, SocketAddr),
    Timeout,
    ShutdownSignal,
    Failed(std::io::Error),
}

/// A bound, not yet running bridge listener
pub struct BridgeServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<BridgeConfig>,
    observer: Arc<dyn BridgeObserver>,
    state: Arc<RwLock<BridgeState>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl BridgeServer {
    /// Bind the listening socket
    ///
    /// A bind failure is reported to the observer before it is returned.
    pub async fn bind(config: BridgeConfig, observer: Arc<dyn BridgeObserver>) -> Result<Self> {
        let catalog = Catalog::new(config.language);

        let listener = match open_listener(&config).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to start listener on {}: {}", config.bind_addr(), e);
                let label = catalog.text(MessageKey::Error);
                observer.on_log_line(&format!("[{}] {}", label, e)).await;
                observer
                    .on_connection_status(&format!("{} {}", label, e), Severity::Error)
                    .await;
                return Err(e);
            }
        };
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, _) = watch::channel(false);
        let state = BridgeState {
            listening: true,
            ..BridgeState::default()
        };

        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
            observer,
            state: Arc::new(RwLock::new(state)),
            shutdown_tx: Arc::new(shutdown_tx),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start the accept loop on the runtime and return its control handle
    pub fn spawn(self) -> ServerHandle {
        let shutdown_tx = self.shutdown_tx.clone();
        let state = self.state.clone();
        let local_addr = self.local_addr;
        let task = tokio::spawn(self.run());

        ServerHandle {
            local_addr,
            state,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Accept and serve connections until a stop is requested
    pub async fn run(self) {
        let BridgeServer {
            listener,
            local_addr,
            config,
            observer,
            state,
            shutdown_tx,
        } = self;
        let catalog = Catalog::new(config.language);
        let mut shutdown = shutdown_tx.subscribe();

        tracing::info!("Grbl bridge listening on {}", local_addr);
        let waiting = catalog.text(MessageKey::WaitingConnection);
        observer
            .on_log_line(&format!("[TCP] {} {} ...", waiting, local_addr))
            .await;
        observer
            .on_connection_status(waiting, Severity::Waiting)
            .await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let accepted = tokio::select! {
                changed = shutdown.changed() => match changed {
                    Ok(()) => continue,
                    Err(_) => Accepted::ShutdownSignal,
                },
                result = timeout(config.poll_interval, listener.accept()) => match result {
                    Ok(Ok((stream, peer))) => Accepted::Connection(stream, peer),
                    Ok(Err(e)) => Accepted::Failed(e),
                    Err(_) => Accepted::Timeout,
                },
            };

            match accepted {
                Accepted::Connection(stream, peer) => {
                    let session = Session::new(
                        stream,
                        peer,
                        config.clone(),
                        observer.clone(),
                        state.clone(),
                    );
                    // Awaited in place: the next accept waits for this session.
                    let task = tokio::spawn(session.run(shutdown.clone()));
                    match task.await {
                        Ok(SessionEnd::Failed(e)) => {
                            tracing::debug!("Session with {} ended with error: {}", peer, e)
                        }
                        Ok(end) => tracing::debug!("Session with {} ended: {:?}", peer, end),
                        Err(e) => {
                            report_aborted_session(&*observer, &state, &catalog, peer, e).await
                        }
                    }
                }
                Accepted::Timeout => continue,
                Accepted::ShutdownSignal => break,
                Accepted::Failed(e) => {
                    let err = Error::from(ConnectionError::AcceptFailed {
                        reason: e.to_string(),
                    });
                    tracing::warn!("{}", err);
                    observer
                        .on_log_line(&format!("[{}] {}", catalog.text(MessageKey::Error), err))
                        .await;
                    tokio::time::sleep(config.poll_interval).await;
                }
            }
        }

        drop(listener);
        state.write().listening = false;
        tracing::info!("Grbl bridge on {} stopped", local_addr);
    }
}

/// Bind and start the bridge in one step
pub async fn start(config: BridgeConfig, observer: Arc<dyn BridgeObserver>) -> Result<ServerHandle> {
    Ok(BridgeServer::bind(config, observer).await?.spawn())
}

/// Control handle of a running bridge
pub struct ServerHandle {
    local_addr: SocketAddr,
    state: Arc<RwLock<BridgeState>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Snapshot of the listener and session state
    pub fn state(&self) -> BridgeState {
        self.state.read().clone()
    }

    pub fn is_stopping(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Request shutdown
    ///
    /// Closes the active session and the listening socket. Safe to call from
    /// any thread, any number of times.
    pub fn stop(&self) {
        let already = self.shutdown_tx.send_replace(true);
        if !already {
            tracing::info!("Stop requested for bridge on {}", self.local_addr);
        }
    }

    /// Wait for the accept loop to exit
    pub async fn join(&self) -> Result<()> {
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.await
                .map_err(|e| Error::other(format!("Bridge task failed: {}", e)))?;
        }
        Ok(())
    }

    /// Request shutdown and wait for it to complete
    pub async fn shutdown(&self) -> Result<()> {
        self.stop();
        self.join().await
    }
}

async fn open_listener(config: &BridgeConfig) -> Result<TcpListener> {
    let bind_addr = config.bind_addr();
    let bind_failed = |e: std::io::Error| -> Error {
        ConnectionError::BindFailed {
            addr: bind_addr.clone(),
            reason: e.to_string(),
        }
        .into()
    };

    let addr = tokio::net::lookup_host((config.host.as_str(), config.port))
        .await
        .map_err(|_| ConnectionError::InvalidAddress {
            addr: bind_addr.clone(),
        })?
        .next()
        .ok_or_else(|| ConnectionError::InvalidAddress {
            addr: bind_addr.clone(),
        })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_failed)?;
    socket.set_reuseaddr(true).map_err(bind_failed)?;
    socket.bind(addr).map_err(bind_failed)?;
    socket.listen(config.backlog).map_err(bind_failed)
}

async fn report_aborted_session(
    observer: &dyn BridgeObserver,
    state: &RwLock<BridgeState>,
    catalog: &Catalog,
    peer: SocketAddr,
    e: tokio::task::JoinError,
) {
    tracing::error!("Session task for {} aborted: {}", peer, e);
    state.write().session = SessionState::Disconnected;

    let label = catalog.text(MessageKey::Error);
    observer.on_log_line(&format!("[{}] {}", label, e)).await;
    observer
        .on_connection_status(&format!("{} {}", label, e), Severity::Error)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:23");
        assert_eq!(config.backlog, 1);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.read_chunk_size, 1024);
        assert_eq!(config.max_line_len, 256);
        assert_eq!(
            config.capture.program_file,
            std::path::PathBuf::from("lightburn_program.ngc")
        );
    }

    #[test]
    fn test_config_builders() {
        let capture = CapturePaths::new("job.ngc", "job.log");
        let config = BridgeConfig::default()
            .with_port(0)
            .with_capture(capture.clone());
        assert_eq!(config.bind_addr(), "0.0.0.0:0");
        assert_eq!(config.capture, capture);
    }
}
