//! Session manager for daemon discovery and creation.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use ocr_studio_daemon::{cleanup_session, get_pid_path, get_socket_path};
use ocr_studio_protocol::Request;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::ipc_client::IpcClient;

/// Starts, finds and health-checks the daemon owning a session.
pub struct SessionManager {
    session: String,
}

impl SessionManager {
    pub fn new(session: String) -> Self {
        Self { session }
    }

    pub fn socket_path(&self) -> PathBuf {
        get_socket_path(&self.session)
    }

    pub fn pid_path(&self) -> PathBuf {
        get_pid_path(&self.session)
    }

    /// Check if the daemon is running, removing the session directory if it is stale.
    pub fn is_daemon_alive(&self) -> bool {
        let pid = std::fs::read_to_string(self.pid_path())
            .ok()
            .and_then(|content| content.trim().parse::<u32>().ok());

        let alive = pid.map_or(false, process_exists);
        if !alive && self.pid_path().exists() {
            debug!("Removing stale session '{}'", self.session);
            cleanup_session(&self.session);
        }
        alive
    }

    /// Ensure the daemon is running, starting it if necessary.
    pub async fn ensure_daemon(&self) -> anyhow::Result<IpcClient> {
        if self.is_daemon_alive() {
            if self.ping().await {
                return self.connect_to_daemon().await;
            }
            warn!("Daemon for '{}' not responsive, restarting", self.session);
            cleanup_session(&self.session);
        }

        info!("Starting daemon for session '{}'", self.session);
        self.start_daemon()?;
        self.wait_for_daemon().await
    }

    /// Connect to a daemon that is already running.
    pub async fn connect_to_daemon(&self) -> anyhow::Result<IpcClient> {
        IpcClient::connect(&self.socket_path())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to daemon: {}", e))
    }

    async fn ping(&self) -> bool {
        match IpcClient::connect(&self.socket_path()).await {
            Ok(mut client) => matches!(
                client.send(&Request::Ping, 5000).await,
                Ok(response) if response.success
            ),
            Err(_) => false,
        }
    }

    /// Spawn this executable detached, running `session daemon`.
    fn start_daemon(&self) -> anyhow::Result<()> {
        let exe = std::env::current_exe()?;

        let mut cmd = Command::new(&exe);
        cmd.arg("--session")
            .arg(&self.session)
            .arg("session")
            .arg("daemon")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;

            const DETACHED_PROCESS: u32 = 0x00000008;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
        }

        cmd.spawn()?;
        Ok(())
    }

    /// Poll until the daemon accepts connections.
    async fn wait_for_daemon(&self) -> anyhow::Result<IpcClient> {
        let socket_path = self.socket_path();
        let max_retries = 300; // 30 seconds total
        let retry_delay = Duration::from_millis(100);

        for _ in 0..max_retries {
            #[cfg(unix)]
            let should_try = socket_path.exists();
            #[cfg(windows)]
            let should_try = true;

            if should_try {
                if let Ok(client) = IpcClient::connect(&socket_path).await {
                    debug!("Connected to daemon");
                    return Ok(client);
                }
            }
            sleep(retry_delay).await;
        }

        anyhow::bail!("Daemon failed to start within timeout")
    }

    /// List the sessions that have a PID file.
    pub fn list_sessions() -> Vec<String> {
        let mut sessions = Vec::new();

        if let Ok(entries) = std::fs::read_dir(ocr_studio_daemon::get_base_dir()) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() && path.join("pid").exists() {
                    if let Some(name) = entry.file_name().to_str() {
                        sessions.push(name.to_string());
                    }
                }
            }
        }

        sessions.sort();
        sessions
    }
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    // Signal 0 only checks for existence
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(windows)]
fn process_exists(pid: u32) -> bool {
    use windows_sys::Win32::Foundation::CloseHandle;
    use windows_sys::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            false
        } else {
            CloseHandle(handle);
            true
        }
    }
}
