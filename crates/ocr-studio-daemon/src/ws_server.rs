//! WebSocket view server.
//!
//! A browser view connects, receives a snapshot of the session, and then
//! drives it with the same JSON requests the CLI sends over IPC. Every
//! request is answered with its `Response`; render messages produced by any
//! client (IPC or WebSocket) are pushed to all connected views.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use ocr_studio_protocol::{ErrorCode, Request, Response};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::daemon::process_request;
use crate::shell::Shell;
use crate::view::ViewMessage;

/// Client ID type.
type ClientId = u64;

/// Configuration for the WebSocket server.
pub struct WsServerConfig {
    pub port: u16,
}

/// WebSocket server for the session view.
pub struct WsServer {
    port: u16,
    /// Last assigned client ID.
    next_client_id: Arc<AtomicU64>,
}

impl WsServer {
    /// Create a new WebSocket server.
    pub fn new(config: WsServerConfig) -> Self {
        Self {
            port: config.port,
            next_client_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Bind and start accepting view clients in the background.
    pub async fn start(&self, shell: Arc<Shell>) -> anyhow::Result<()> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("View server listening on ws://{}", addr);

        let next_client_id = Arc::clone(&self.next_client_id);

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("WebSocket connection from {}", addr);

                        let client_id = next_client_id.fetch_add(1, Ordering::Relaxed) + 1;
                        let shell = Arc::clone(&shell);

                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, client_id, shell).await {
                                debug!("Client {} disconnected: {}", client_id, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept WebSocket connection: {}", e);
                    }
                }
            }
        });

        Ok(())
    }
}

/// Handle a single WebSocket client connection.
async fn handle_client(
    stream: TcpStream,
    client_id: ClientId,
    shell: Arc<Shell>,
) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // Subscribe before the snapshot so no update is missed in between.
    let mut view_rx = shell.subscribe_view();

    info!("Client {} connected", client_id);

    let snapshot = {
        let session = shell.session().lock().await;
        ViewMessage::snapshot(&session, shell.preview_quality())
    };
    match snapshot {
        Ok(messages) => {
            for message in messages {
                let json = serde_json::to_string(&message)?;
                ws_sink.send(Message::Text(json.into())).await?;
            }
        }
        Err(e) => warn!("Failed to build snapshot for client {}: {}", client_id, e),
    }

    loop {
        tokio::select! {
            // Render messages from any client
            result = view_rx.recv() => {
                match result {
                    Ok(json) => {
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            debug!("Failed to send to client {}: {}", client_id, e);
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!("Client {} lagged {} messages", client_id, n);
                    }
                    Err(_) => break,
                }
            }

            // Requests from this client
            result = ws_stream.next() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_client_message(&text, &shell).await;
                        let json = serde_json::to_string(&response)?;
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            debug!("Failed to reply to client {}: {}", client_id, e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket error for client {}: {}", client_id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Handle one request message from a view client.
async fn handle_client_message(text: &str, shell: &Shell) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            debug!("Failed to parse WebSocket message: {} - {}", e, text);
            return Response::error(ErrorCode::InvalidRequest, format!("Invalid request: {}", e));
        }
    };

    if matches!(request, Request::Shutdown) {
        return Response::error(
            ErrorCode::InvalidRequest,
            "Shutdown is only accepted from the CLI",
        );
    }

    process_request(request, shell).await
}
