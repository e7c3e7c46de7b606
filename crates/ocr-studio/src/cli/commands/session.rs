//! Session management command implementation.

use ocr_studio_protocol::{ErrorCode, Request, Response, ResponseData, SessionSummary};

use super::finish;
use crate::cli::{SessionAction, SessionArgs};
use crate::ipc_client::try_connect;
use crate::output::Output;
use crate::session_manager::SessionManager;

pub async fn run(
    session: &str,
    args: SessionArgs,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    match args.action {
        SessionAction::List => list_sessions(output).await,
        SessionAction::Info => {
            send_to_running(session, Request::SessionInfo, output, timeout_ms).await
        }
        SessionAction::Stop => {
            send_to_running(session, Request::Shutdown, output, timeout_ms).await
        }
        SessionAction::Daemon => ocr_studio_daemon::run_server(session).await,
    }
}

async fn list_sessions(output: &Output) -> anyhow::Result<()> {
    let mut summaries = Vec::new();

    for name in SessionManager::list_sessions() {
        let manager = SessionManager::new(name.clone());
        let mut summary = SessionSummary {
            name,
            state: None,
            model: None,
        };

        if manager.is_daemon_alive() {
            if let Ok(mut client) = try_connect(&manager.socket_path(), 1, 100).await {
                if let Ok(response) = client.send(&Request::SessionInfo, 5000).await {
                    if let Some(ResponseData::SessionInfo(info)) = response.data {
                        summary.state = Some(info.state);
                        summary.model = Some(info.model);
                    }
                }
            }
        }

        summaries.push(summary);
    }

    output.print_response(&Response::success(ResponseData::SessionList {
        sessions: summaries,
    }));
    Ok(())
}

/// Send a request without starting a daemon.
async fn send_to_running(
    session: &str,
    request: Request,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    let manager = SessionManager::new(session.to_string());

    if !manager.is_daemon_alive() {
        output.print_error(ErrorCode::DaemonNotRunning, "No daemon running for this session");
        std::process::exit(1);
    }

    let mut client = manager.connect_to_daemon().await?;
    let response = client.send(&request, timeout_ms).await?;
    finish(output, &response)
}
