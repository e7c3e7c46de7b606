//! Text command implementation.

use ocr_studio_protocol::Request;

use super::{finish, send};
use crate::output::Output;

pub async fn run(session: &str, output: &Output, timeout_ms: u64) -> anyhow::Result<()> {
    let response = send(session, &Request::GetText, timeout_ms).await?;
    finish(output, &response)
}
