//! Upload command implementation.

use base64::Engine;
use ocr_studio_protocol::{ErrorCode, Request, UploadRequest};

use super::{finish, send};
use crate::cli::UploadArgs;
use crate::output::Output;

pub async fn run(
    session: &str,
    args: UploadArgs,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    let bytes = match std::fs::read(&args.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            output.print_error(
                ErrorCode::InvalidRequest,
                &format!("Failed to read {}: {}", args.path.display(), e),
            );
            std::process::exit(1);
        }
    };

    let name = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let request = Request::Upload(UploadRequest {
        name,
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    });

    let response = send(session, &request, timeout_ms).await?;
    finish(output, &response)
}
