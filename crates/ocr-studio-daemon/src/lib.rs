//! Daemon process hosting an ocr-studio session.
//!
//! The daemon owns one session (uploaded image, extracted text, selected
//! model), a process-wide cache of loaded OCR models, and serves CLI
//! commands over IPC plus an optional WebSocket view.

pub mod config;
pub mod daemon;
pub mod handlers;
pub mod highlight;
pub mod invoker;
pub mod ipc_server;
pub mod model;
pub mod session;
pub mod shell;
pub mod view;
pub mod ws_server;

#[cfg(test)]
mod testing;

pub use config::DaemonConfig;
pub use daemon::Daemon;
pub use highlight::highlight;
pub use invoker::OcrInvoker;
pub use ipc_server::IpcServer;
pub use model::{ModelLoader, ModelRegistry, OcrModel};
pub use session::Session;

/// Get the base directory holding all session directories.
pub fn get_base_dir() -> std::path::PathBuf {
    std::env::temp_dir().join("ocr-studio")
}

/// Get the session directory path.
pub fn get_session_dir(session: &str) -> std::path::PathBuf {
    get_base_dir().join(session)
}

/// Get the socket path for a session.
pub fn get_socket_path(session: &str) -> std::path::PathBuf {
    #[cfg(unix)]
    {
        get_session_dir(session).join("socket")
    }
    #[cfg(windows)]
    {
        // Only the file stem is used, to derive the TCP port
        std::path::PathBuf::from(format!("{}.sock", session))
    }
}

/// Get the PID file path for a session.
pub fn get_pid_path(session: &str) -> std::path::PathBuf {
    get_session_dir(session).join("pid")
}

/// Get the TCP port for a session (Windows fallback).
/// Uses a deterministic hash of the session name to derive a port in the range 49152-65535.
pub fn get_session_port(session: &str) -> u16 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    session.hash(&mut hasher);
    let hash = hasher.finish();
    49152 + (hash % 16384) as u16
}

/// Clean up a session directory.
pub fn cleanup_session(session: &str) {
    let dir = get_session_dir(session);
    let _ = std::fs::remove_dir_all(&dir);
}

/// Run the daemon server for the given session.
/// This is the main entry point called by `ocr-studio session daemon`.
pub async fn run_server(session: &str) -> anyhow::Result<()> {
    use std::io::Write;

    let config = DaemonConfig::from_env()?;

    let session_dir = get_session_dir(session);
    std::fs::create_dir_all(&session_dir)?;

    let pid_path = get_pid_path(session);
    let mut pid_file = std::fs::File::create(&pid_path)?;
    writeln!(pid_file, "{}", std::process::id())?;
    drop(pid_file);

    let mut daemon = Daemon::new(session.to_string(), config).await?;
    let result = daemon.run().await;

    cleanup_session(session);

    result
}
