//! Connection session
//!
//! Drives one accepted client socket: sends the Grbl banner, then reads the
//! stream in bounded polls, routing each complete line through
//! classification, response and capture. Lines are captured and acknowledged
//! strictly in the order they arrive.

use crate::communication::capture::ProgramCapture;
use crate::communication::state::{BridgeState, SessionState};
use crate::communication::tcp::BridgeConfig;
use crate::firmware::grbl::{
    banner_frame, respond, ClassifiedLine, LineSplitter, Reply, Response, GRBL_BANNER,
};
use grblbridge_core::{
    BridgeObserver, Catalog, ConnectionError, Error, MessageKey, ProgramStatus, Result, Severity,
};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer closed the connection
    PeerClosed,
    /// The listener is shutting down
    Shutdown,
    /// Socket or capture I/O failed
    Failed(Error),
}

impl SessionEnd {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionEnd::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

enum Polled {
    Data(usize),
    Closed,
    Timeout,
    ShutdownSignal,
    ReadError(std::io::Error),
}

/// One accepted client connection
pub struct Session {
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<BridgeConfig>,
    observer: Arc<dyn BridgeObserver>,
    state: Arc<RwLock<BridgeState>>,
    catalog: Catalog,
    splitter: LineSplitter,
    connected: bool,
    receiving_program: bool,
}

impl Session {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        config: Arc<BridgeConfig>,
        observer: Arc<dyn BridgeObserver>,
        state: Arc<RwLock<BridgeState>>,
    ) -> Self {
        let catalog = Catalog::new(config.language);
        let splitter = LineSplitter::with_max_line_len(config.max_line_len);
        Self {
            stream,
            peer,
            config,
            observer,
            state,
            catalog,
            splitter,
            connected: false,
            receiving_program: false,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_receiving_program(&self) -> bool {
        self.receiving_program
    }

    /// Run the session to completion
    ///
    /// Never returns an error: failures end the session and are reported to
    /// the observer, so the accept loop can carry on.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SessionEnd {
        self.mark_connected().await;

        let end = match self.serve(&mut shutdown).await {
            Ok(end) => end,
            Err(e) => SessionEnd::Failed(e),
        };

        self.finish(&end).await;
        end
    }

    async fn mark_connected(&mut self) {
        self.connected = true;
        {
            let mut state = self.state.write();
            state.session = SessionState::Connected;
            state.peer = Some(self.peer);
            state.lines_captured = 0;
            state.sessions_served += 1;
        }

        tracing::info!("Client connected from {}", self.peer);
        let connected = self.catalog.text(MessageKey::Connected);
        self.observer
            .on_log_line(&format!("[TCP] {} {}", connected, self.peer))
            .await;
        self.observer
            .on_connection_status(
                &format!("{} {}", connected, self.peer.ip()),
                Severity::Connected,
            )
            .await;
    }

    async fn serve(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<SessionEnd> {
        let mut capture = ProgramCapture::open(&self.config.capture).await?;

        if self.send_frame(&banner_frame(), shutdown).await? == Flow::Stop {
            return Ok(SessionEnd::Shutdown);
        }
        self.observer
            .on_log_line(&format!("\u{2192} {}", GRBL_BANNER))
            .await;

        let mut buf = vec![0u8; self.config.read_chunk_size.max(1)];
        loop {
            if *shutdown.borrow() {
                return Ok(SessionEnd::Shutdown);
            }

            let polled = tokio::select! {
                changed = shutdown.changed() => match changed {
                    Ok(()) => continue,
                    Err(_) => Polled::ShutdownSignal,
                },
                read = timeout(self.config.poll_interval, self.stream.read(&mut buf)) => match read {
                    Ok(Ok(0)) => Polled::Closed,
                    Ok(Ok(n)) => Polled::Data(n),
                    Ok(Err(e)) => Polled::ReadError(e),
                    Err(_) => Polled::Timeout,
                },
            };

            match polled {
                Polled::Data(n) => {
                    for raw in self.splitter.push(&buf[..n]) {
                        if self.handle_line(raw, &mut capture, shutdown).await? == Flow::Stop {
                            return Ok(SessionEnd::Shutdown);
                        }
                    }
                }
                Polled::Timeout => continue,
                Polled::Closed => {
                    if let Some(fragment) = self.splitter.take_remainder() {
                        tracing::warn!(
                            "Discarding unterminated line from {}: {:?}",
                            self.peer,
                            fragment
                        );
                    }
                    return Ok(SessionEnd::PeerClosed);
                }
                Polled::ShutdownSignal => return Ok(SessionEnd::Shutdown),
                Polled::ReadError(e) => {
                    return Err(ConnectionError::ConnectionLost {
                        reason: e.to_string(),
                    }
                    .into())
                }
            }
        }
    }

    async fn handle_line(
        &mut self,
        raw: String,
        capture: &mut ProgramCapture,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Flow> {
        let line = ClassifiedLine::new(raw);
        tracing::debug!("Received {:?} line: {:?}", line.kind, line.trimmed);

        match respond(&line) {
            Response::Ignore => Ok(Flow::Continue),
            Response::Reply(reply) => self.send_frame(&reply.frame(), shutdown).await,
            Response::CaptureAndAck(program_line) => {
                if !self.receiving_program {
                    self.begin_program().await;
                }

                capture.append(&program_line).await?;
                self.state.write().lines_captured = capture.lines_written();
                self.observer
                    .on_log_line(&format!("\u{2190} {}", program_line))
                    .await;

                self.send_frame(&Reply::Ok.frame(), shutdown).await
            }
        }
    }

    async fn begin_program(&mut self) {
        self.receiving_program = true;
        self.state.write().session = SessionState::ReceivingProgram;

        tracing::info!("Receiving program from {}", self.peer);
        self.observer
            .on_program_status(
                ProgramStatus::Receiving,
                self.catalog.text(MessageKey::ReceivingProgram),
            )
            .await;
    }

    /// Write one reply frame
    ///
    /// A peer that stops reading blocks the write; a stop request ends the
    /// wait instead of waiting for buffer space.
    async fn send_frame(
        &mut self,
        frame: &str,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Flow> {
        let stream = &mut self.stream;
        let write = async {
            stream.write_all(frame.as_bytes()).await?;
            stream.flush().await?;
            Ok::<(), std::io::Error>(())
        };

        tokio::select! {
            _ = shutdown.wait_for(|stop| *stop) => Ok(Flow::Stop),
            written = write => match written {
                Ok(()) => Ok(Flow::Continue),
                Err(e) => Err(send_failed(&e)),
            },
        }
    }

    async fn finish(&mut self, end: &SessionEnd) {
        let error_label = self.catalog.text(MessageKey::Error);
        match end {
            SessionEnd::PeerClosed => tracing::info!("Client {} disconnected", self.peer),
            SessionEnd::Shutdown => {
                tracing::info!("Closing session with {} for shutdown", self.peer)
            }
            SessionEnd::Failed(e) => {
                tracing::error!("Session with {} failed: {}", self.peer, e);
                self.observer
                    .on_log_line(&format!("[{}] {}", error_label, e))
                    .await;
                self.observer
                    .on_connection_status(&format!("{} {}", error_label, e), Severity::Error)
                    .await;
            }
        }

        // Close errors are irrelevant at this point.
        let _ = self.stream.shutdown().await;

        self.connected = false;
        let was_receiving = std::mem::replace(&mut self.receiving_program, false);
        self.state.write().session = SessionState::Disconnected;

        self.observer
            .on_connection_status(
                self.catalog.text(MessageKey::ConnectionLost),
                Severity::Waiting,
            )
            .await;

        if was_receiving {
            tracing::info!("Program received from {}", self.peer);
            self.observer
                .on_program_status(
                    ProgramStatus::Received,
                    self.catalog.text(MessageKey::ProgramReceived),
                )
                .await;
        }
    }
}

fn send_failed(e: &std::io::Error) -> Error {
    ConnectionError::SendFailed {
        reason: e.to_string(),
    }
    .into()
}
