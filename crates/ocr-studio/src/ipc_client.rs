//! IPC client for communicating with the daemon.

use std::io;
use std::path::Path;
use std::time::Duration;

use ocr_studio_protocol::{Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;

/// IPC client for daemon communication.
pub struct IpcClient {
    #[cfg(unix)]
    stream: tokio::net::UnixStream,
    #[cfg(windows)]
    stream: tokio::net::TcpStream,
}

impl IpcClient {
    /// Connect to the daemon listening at `socket_path`.
    #[cfg(unix)]
    pub async fn connect(socket_path: &Path) -> io::Result<Self> {
        let stream = tokio::net::UnixStream::connect(socket_path).await?;
        Ok(Self { stream })
    }

    #[cfg(windows)]
    pub async fn connect(socket_path: &Path) -> io::Result<Self> {
        let session = socket_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("default");

        let addr = format!("127.0.0.1:{}", ocr_studio_daemon::get_session_port(session));
        let stream = tokio::net::TcpStream::connect(&addr).await?;
        Ok(Self { stream })
    }

    /// Send a request and receive a response.
    pub async fn send(&mut self, request: &Request, timeout_ms: u64) -> anyhow::Result<Response> {
        let json = serde_json::to_string(request)? + "\n";

        self.stream.write_all(json.as_bytes()).await?;
        self.stream.flush().await?;

        let response = timeout(Duration::from_millis(timeout_ms), self.read_response())
            .await
            .map_err(|_| anyhow::anyhow!("Request timed out"))??;

        Ok(response)
    }

    /// Read a response from the stream.
    async fn read_response(&mut self) -> anyhow::Result<Response> {
        let mut reader = BufReader::new(&mut self.stream);
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            anyhow::bail!("Daemon closed the connection");
        }

        let response: Response = serde_json::from_str(line.trim())?;
        Ok(response)
    }
}

/// Try to connect to an existing daemon, with retries.
pub async fn try_connect(socket_path: &Path, retries: u32, delay_ms: u64) -> io::Result<IpcClient> {
    let mut last_error = io::Error::new(io::ErrorKind::NotFound, "No connection attempts made");

    for _ in 0..retries {
        match IpcClient::connect(socket_path).await {
            Ok(client) => return Ok(client),
            Err(e) => {
                last_error = e;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }

    Err(last_error)
}

#[cfg(all(test, unix))]
mod tests {
    use ocr_studio_protocol::ResponseData;
    use tokio::net::UnixListener;

    use super::*;

    #[tokio::test]
    async fn test_send_round_trips_one_line() {
        let dir = std::env::temp_dir().join(format!("ocr-studio-ipc-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("socket");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut line = String::new();
            BufReader::new(reader).read_line(&mut line).await.unwrap();
            assert_eq!(line.trim(), r#"{"type":"ping"}"#);
            writer.write_all(b"{\"success\":true,\"data\":{\"type\":\"pong\"}}\n").await.unwrap();
        });

        let mut client = try_connect(&path, 3, 10).await.unwrap();
        let response = client.send(&Request::Ping, 5000).await.unwrap();
        assert!(response.success);
        assert!(matches!(response.data, Some(ResponseData::Pong)));

        server.await.unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_try_connect_missing_socket_fails() {
        let path = std::env::temp_dir().join("ocr-studio-ipc-test-missing").join("socket");
        assert!(try_connect(&path, 2, 1).await.is_err());
    }
}
