//! IPC server for CLI communication.

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Platform-specific IPC stream type alias.
#[cfg(unix)]
pub type IpcStream = tokio::net::UnixStream;

#[cfg(windows)]
pub type IpcStream = tokio::net::TcpStream;

/// IPC server that listens for CLI connections.
pub struct IpcServer {
    #[cfg(unix)]
    listener: tokio::net::UnixListener,

    #[cfg(windows)]
    listener: tokio::net::TcpListener,

    /// Path or address for display purposes.
    address: String,
}

impl IpcServer {
    /// Bind to the given socket path (Unix) or a port derived from the session (Windows).
    #[cfg(unix)]
    pub async fn bind(path: &Path) -> Result<Self, IpcError> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }

        let listener = tokio::net::UnixListener::bind(path)?;
        let address = path.display().to_string();

        info!("IPC server listening on {}", address);

        Ok(Self { listener, address })
    }

    #[cfg(windows)]
    pub async fn bind(path: &Path) -> Result<Self, IpcError> {
        let session = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("default");

        let addr = format!("127.0.0.1:{}", crate::get_session_port(session));
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("IPC server listening on {}", addr);

        Ok(Self {
            listener,
            address: addr,
        })
    }

    /// Accept a new client connection.
    pub async fn accept(&self) -> Result<IpcStream, IpcError> {
        let (stream, _) = self.listener.accept().await?;
        Ok(stream)
    }

    /// Get the address this server is listening on.
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(all(test, unix))]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use super::*;

    #[tokio::test]
    async fn test_bind_and_accept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("socket");

        let server = IpcServer::bind(&path).await.unwrap();
        assert_eq!(server.address(), path.display().to_string());

        let client = tokio::spawn({
            let path = path.clone();
            async move {
                let mut stream = tokio::net::UnixStream::connect(&path).await.unwrap();
                stream.write_all(b"{\"type\":\"ping\"}\n").await.unwrap();
            }
        });

        let stream = server.accept().await.unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).await.unwrap();
        assert_eq!(line.trim(), r#"{"type":"ping"}"#);
        client.await.unwrap();
    }

    #[tokio::test]
    async fn test_rebind_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("socket");

        let first = IpcServer::bind(&path).await.unwrap();
        drop(first);
        assert!(IpcServer::bind(&path).await.is_ok());
    }
}
