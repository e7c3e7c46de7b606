//! Output formatting for CLI responses.

use ocr_studio_protocol::{ErrorCode, Response, ResponseData};

/// Output formatter.
pub struct Output {
    json: bool,
}

impl Output {
    /// Create a new output formatter.
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print a response.
    pub fn print_response(&self, response: &Response) {
        if self.json {
            match serde_json::to_string(response) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error [internal error]: {}", e),
            }
        } else if response.success {
            match response.data {
                Some(ref data) => println!("{}", format_data(data)),
                None => println!("OK"),
            }
        } else if let Some(ref error) = response.error {
            eprintln!("Error [{}]: {}", error.code, error.message);
        }
    }

    /// Print an error that did not come from the daemon.
    pub fn print_error(&self, code: ErrorCode, message: &str) {
        self.print_response(&Response::error(code, message));
    }
}

/// Render response data for humans.
fn format_data(data: &ResponseData) -> String {
    match data {
        ResponseData::Ok => "OK".to_string(),
        ResponseData::Uploaded(info) => format!(
            "Uploaded {} ({}x{} {})",
            info.name, info.width, info.height, info.format
        ),
        ResponseData::ModelSelected { model } => format!("Selected model: {}", model),
        ResponseData::OcrResult { text, .. } => text.clone(),
        ResponseData::Highlighted { markup, .. } => markup.clone(),
        ResponseData::Text { text } => text.clone(),
        ResponseData::SessionInfo(info) => {
            let mut lines = vec![
                format!("Session: {}", info.name),
                format!("State: {:?}", info.state),
                format!("Model: {}", info.model),
            ];
            if let Some(ref image) = info.image {
                lines.push(format!(
                    "Image: {} ({}x{} {})",
                    image.name, image.width, image.height, image.format
                ));
            }
            if !info.loaded_models.is_empty() {
                let loaded: Vec<&str> = info.loaded_models.iter().map(|m| m.label()).collect();
                lines.push(format!("Loaded: {}", loaded.join(", ")));
            }
            lines.push(format!("PID: {}", info.pid));
            lines.push(format!("Uptime: {}s", info.uptime_secs));
            lines.join("\n")
        }
        ResponseData::SessionList { sessions } => {
            if sessions.is_empty() {
                "No active sessions".to_string()
            } else {
                sessions
                    .iter()
                    .map(|s| {
                        let state = s.state.map_or("-".to_string(), |st| format!("{:?}", st));
                        let model = s.model.map_or("-", |m| m.label());
                        format!("{}: {} ({})", s.name, state, model)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        ResponseData::Pong => "Pong".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use ocr_studio_protocol::{ImageInfo, ModelOption, SessionState, SessionSummary};

    use super::*;

    #[test]
    fn test_format_uploaded() {
        let data = ResponseData::Uploaded(ImageInfo {
            name: "hello.png".to_string(),
            width: 100,
            height: 50,
            format: "png".to_string(),
        });
        assert_eq!(format_data(&data), "Uploaded hello.png (100x50 png)");
    }

    #[test]
    fn test_format_result_is_raw_text() {
        let data = ResponseData::OcrResult {
            model: ModelOption::EnglishHindiCpu,
            text: "HELLO\nWORLD".to_string(),
        };
        assert_eq!(format_data(&data), "HELLO\nWORLD");
    }

    #[test]
    fn test_format_session_list() {
        let data = ResponseData::SessionList {
            sessions: vec![
                SessionSummary {
                    name: "default".to_string(),
                    state: Some(SessionState::ResultReady),
                    model: Some(ModelOption::EnglishGpu),
                },
                SessionSummary {
                    name: "stale".to_string(),
                    state: None,
                    model: None,
                },
            ],
        };
        assert_eq!(
            format_data(&data),
            "default: ResultReady (OCR for English (GPU))\nstale: - (-)"
        );
    }
}
