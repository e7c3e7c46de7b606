//! Command implementations.

pub mod highlight;
pub mod model;
pub mod run;
pub mod session;
pub mod text;
pub mod upload;
pub mod view;

use ocr_studio_protocol::{Request, Response};

use crate::session_manager::SessionManager;

/// Send one request to the session daemon, starting it if needed.
pub(crate) async fn send(
    session: &str,
    request: &Request,
    timeout_ms: u64,
) -> anyhow::Result<Response> {
    let manager = SessionManager::new(session.to_string());
    let mut client = manager.ensure_daemon().await?;
    client.send(request, timeout_ms).await
}

/// Print a response and exit non-zero if it reports a failure.
pub(crate) fn finish(output: &crate::output::Output, response: &Response) -> anyhow::Result<()> {
    output.print_response(response);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
