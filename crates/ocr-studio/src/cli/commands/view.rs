//! View command implementation: prints the WebSocket view address.

use ocr_studio_protocol::ErrorCode;

use crate::output::Output;

pub fn run(ui_port: u16, output: &Output) -> anyhow::Result<()> {
    if ui_port == 0 {
        output.print_error(
            ErrorCode::InvalidRequest,
            "The view is disabled; start the session with --ui-port <PORT>",
        );
        std::process::exit(1);
    }

    let url = format!("ws://127.0.0.1:{}", ui_port);
    if output.is_json() {
        println!("{}", serde_json::json!({ "url": url }));
    } else {
        println!("{}", url);
    }

    Ok(())
}
