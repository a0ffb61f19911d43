//! TCP debug server

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::protocol::{DebugCommand, DebugResponse};

/// Trait that the application implements to handle debug commands
pub trait DebugHandler: Send + Sync + 'static {
    fn handle_command(&mut self, cmd: DebugCommand) -> DebugResponse;
}

#[derive(Debug, thiserror::Error)]
pub enum DebugError {
    #[error("failed to bind debug server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
}

/// Debug server handle - keep this alive to keep the server running
pub struct DebugServer {
    handle: tokio::task::JoinHandle<()>,
}

impl DebugServer {
    /// Start the debug server on the given port.
    /// Returns immediately; a bind failure is logged from the background task.
    pub fn start(handler: Arc<Mutex<dyn DebugHandler>>, port: u16) -> Self {
        let handle = tokio::spawn(async move {
            if let Err(e) = serve(handler, port).await {
                log::error!("{}", e);
            }
        });

        Self { handle }
    }

    /// Stop accepting connections.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Bind and serve until the task is cancelled.
pub async fn serve(handler: Arc<Mutex<dyn DebugHandler>>, port: u16) -> Result<(), DebugError> {
    let listener = bind(port).await?;
    accept_loop(listener, handler).await;
    Ok(())
}

pub async fn bind(port: u16) -> Result<TcpListener, DebugError> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| DebugError::Bind { addr: addr.clone(), source })?;
    log::info!("Debug server listening on {}", addr);
    Ok(listener)
}

async fn accept_loop(listener: TcpListener, handler: Arc<Mutex<dyn DebugHandler>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                log::info!("Debug client connected from {}", peer);
                let handler = handler.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, handler).await {
                        log::warn!("Debug client {}: {}", peer, e);
                    }
                    log::info!("Debug client disconnected: {}", peer);
                });
            }
            Err(e) => {
                log::error!("Debug server accept error: {}", e);
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, handler: Arc<Mutex<dyn DebugHandler>>) -> Result<(), DebugError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = dispatch(trimmed, &handler).await;
        let mut resp_json = serde_json::to_string(&response).unwrap_or_else(|e| {
            format!("{{\"status\":\"error\",\"message\":\"Serialize error: {}\"}}", e)
        });
        resp_json.push('\n');

        writer.write_all(resp_json.as_bytes()).await?;
        writer.flush().await?;
    }
}

async fn dispatch(line: &str, handler: &Arc<Mutex<dyn DebugHandler>>) -> DebugResponse {
    match serde_json::from_str::<DebugCommand>(line) {
        Ok(cmd) => {
            log::debug!("Debug command: {:?}", cmd);
            let mut h = handler.lock().await;
            h.handle_command(cmd)
        }
        Err(e) => {
            log::warn!("Ignoring malformed debug command: {}", e);
            DebugResponse::error(format!("Invalid command JSON: {}", e))
        }
    }
}
