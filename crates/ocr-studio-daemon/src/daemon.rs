//! Main daemon event loop.

use std::sync::Arc;
use std::time::Duration;

use ocr_studio_protocol::{ErrorCode, Request, Response, ResponseData};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::config::DaemonConfig;
use crate::handlers;
use crate::invoker::OcrInvoker;
use crate::ipc_server::IpcServer;
use crate::model::{ModelRegistry, OcrsLoader};
use crate::shell::Shell;
use crate::ws_server::{WsServer, WsServerConfig};

/// Time given to in-flight replies before a fatal error ends the daemon.
const FATAL_GRACE: Duration = Duration::from_millis(250);

/// The main daemon that hosts one OCR session.
pub struct Daemon {
    /// Session name.
    session_name: String,

    /// Session state, models and view channel.
    shell: Arc<Shell>,

    /// IPC server for CLI communication.
    ipc_server: IpcServer,

    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,

    /// Fatal errors (model load failures) that end the session.
    fatal_rx: mpsc::Receiver<String>,
}

impl Daemon {
    /// Create a new daemon for the given session.
    pub async fn new(session_name: String, config: DaemonConfig) -> anyhow::Result<Self> {
        let socket_path = crate::get_socket_path(&session_name);

        // Clean up stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let ipc_server = IpcServer::bind(&socket_path).await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let (fatal_tx, fatal_rx) = mpsc::channel(1);

        let registry = ModelRegistry::new(OcrsLoader::new(
            config.models_dir.clone(),
            config.accelerator_available,
        ));
        let invoker = OcrInvoker::new(config.work_dir.clone());
        let shell = Arc::new(Shell::new(
            session_name.clone(),
            registry,
            invoker,
            config.preview_quality,
            fatal_tx,
        ));

        if config.ui_port > 0 {
            let ws_server = WsServer::new(WsServerConfig {
                port: config.ui_port,
            });
            match ws_server.start(Arc::clone(&shell)).await {
                Ok(()) => info!("View server enabled on port {}", config.ui_port),
                Err(e) => warn!("Failed to start view server: {}", e),
            }
        }

        info!(
            "Daemon started for session '{}' at {:?} (models: {:?}, work dir: {:?})",
            session_name, socket_path, config.models_dir, config.work_dir
        );

        Ok(Self {
            session_name,
            shell,
            ipc_server,
            shutdown_tx,
            fatal_rx,
        })
    }

    /// Run the daemon event loop.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                // Accept new CLI connections
                result = self.ipc_server.accept() => {
                    match result {
                        Ok(stream) => {
                            let shell = Arc::clone(&self.shell);
                            let shutdown_tx = self.shutdown_tx.clone();

                            tokio::spawn(async move {
                                if let Err(e) = handle_client(stream, shell, shutdown_tx).await {
                                    error!("Client handler error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                // A model could not be loaded
                Some(reason) = self.fatal_rx.recv() => {
                    error!("Fatal configuration error, shutting down daemon: {}", reason);
                    tokio::time::sleep(FATAL_GRACE).await;
                    break;
                }

                // Handle shutdown signal from client
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown request from client");
                    break;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, cleaning up...");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// Gracefully shut down the daemon.
    async fn shutdown(&mut self) -> anyhow::Result<()> {
        info!("Shutting down daemon...");

        let socket_path = crate::get_socket_path(&self.session_name);
        let pid_path = crate::get_pid_path(&self.session_name);

        let _ = std::fs::remove_file(&socket_path);
        let _ = std::fs::remove_file(&pid_path);

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Handle a single client connection.
async fn handle_client(
    stream: crate::ipc_server::IpcStream,
    shell: Arc<Shell>,
    shutdown_tx: broadcast::Sender<()>,
) -> anyhow::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;

        if n == 0 {
            // Client disconnected
            break;
        }

        let request: Request = match serde_json::from_str(line.trim()) {
            Ok(req) => req,
            Err(e) => {
                let resp =
                    Response::error(ErrorCode::InvalidRequest, format!("Invalid request: {}", e));
                let json = serde_json::to_string(&resp)? + "\n";
                writer.write_all(json.as_bytes()).await?;
                writer.flush().await?;
                continue;
            }
        };

        let is_shutdown = matches!(request, Request::Shutdown);

        let response = process_request(request, &shell).await;

        let json = serde_json::to_string(&response)? + "\n";
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;

        // Trigger daemon shutdown if this was a shutdown request
        if is_shutdown {
            info!("Shutdown request received, signaling daemon to exit");
            let _ = shutdown_tx.send(());
            break;
        }
    }

    Ok(())
}

/// Process a single request and return a response.
pub(crate) async fn process_request(request: Request, shell: &Shell) -> Response {
    match request {
        Request::Ping => Response::success(ResponseData::Pong),

        Request::SessionInfo => Response::success(ResponseData::SessionInfo(shell.info().await)),

        Request::Shutdown => {
            // Will trigger shutdown after response is sent
            Response::ok()
        }

        Request::Upload(params) => handlers::upload::handle(shell, params).await,

        Request::SelectModel(params) => handlers::model::handle(shell, params).await,

        Request::RunOcr => handlers::ocr::handle(shell).await,

        Request::Highlight(params) => handlers::highlight::handle(shell, params).await,

        Request::GetText => handlers::highlight::handle_get_text(shell).await,
    }
}
