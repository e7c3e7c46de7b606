//! Everything one daemon needs to serve its session.

use std::time::Instant;

use ocr_studio_protocol::SessionInfo;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{error, trace};

use crate::invoker::OcrInvoker;
use crate::model::ModelRegistry;
use crate::session::Session;
use crate::view::ViewMessage;

/// The session together with its model cache, invoker and view channel.
///
/// Actions lock `session` for their whole duration, so actions arriving on
/// different connections run one after another.
pub struct Shell {
    name: String,
    session: Mutex<Session>,
    registry: ModelRegistry,
    invoker: OcrInvoker,
    preview_quality: u8,
    start_time: Instant,
    view_tx: broadcast::Sender<String>,
    fatal_tx: mpsc::Sender<String>,
}

impl Shell {
    pub fn new(
        name: String,
        registry: ModelRegistry,
        invoker: OcrInvoker,
        preview_quality: u8,
        fatal_tx: mpsc::Sender<String>,
    ) -> Self {
        let (view_tx, _) = broadcast::channel(16);
        Self {
            name,
            session: Mutex::new(Session::default()),
            registry,
            invoker,
            preview_quality,
            start_time: Instant::now(),
            view_tx,
            fatal_tx,
        }
    }

    pub fn session(&self) -> &Mutex<Session> {
        &self.session
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn invoker(&self) -> &OcrInvoker {
        &self.invoker
    }

    pub fn preview_quality(&self) -> u8 {
        self.preview_quality
    }

    /// Subscribe to serialized view messages.
    pub fn subscribe_view(&self) -> broadcast::Receiver<String> {
        self.view_tx.subscribe()
    }

    /// Push a render message to every connected view.
    pub fn publish(&self, message: &ViewMessage) {
        if self.view_tx.receiver_count() == 0 {
            return;
        }

        match serde_json::to_string(message) {
            Ok(json) => {
                trace!("Publishing view message: {}", json);
                let _ = self.view_tx.send(json);
            }
            Err(e) => error!("Failed to serialize view message: {}", e),
        }
    }

    /// Signal that the session cannot continue.
    pub fn report_fatal(&self, reason: impl Into<String>) {
        if self.fatal_tx.try_send(reason.into()).is_err() {
            // A fatal error is already pending.
            trace!("Fatal signal already queued");
        }
    }

    /// Describe the session.
    pub async fn info(&self) -> SessionInfo {
        let session = self.session.lock().await;
        SessionInfo {
            name: self.name.clone(),
            state: session.state(),
            model: session.selected_model(),
            image: session.image().map(|image| image.info()),
            loaded_models: self.registry.loaded(),
            pid: std::process::id(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{FakeLoader, FakeModel};

    /// A shell over a fake model, with its fatal receiver and scratch dir.
    pub(crate) fn shell_with(
        model: Option<FakeModel>,
    ) -> (Shell, mpsc::Receiver<String>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let loader = match model {
            Some(model) => FakeLoader::new(model),
            None => FakeLoader::failing(),
        };
        let (fatal_tx, fatal_rx) = mpsc::channel(1);
        let shell = Shell::new(
            "test".to_string(),
            ModelRegistry::new(loader),
            OcrInvoker::new(dir.path().to_path_buf()),
            80,
            fatal_tx,
        );
        (shell, fatal_rx, dir)
    }

    #[tokio::test]
    async fn test_info_of_fresh_session() {
        let (shell, _fatal_rx, _dir) = shell_with(Some(FakeModel::text("x")));
        let info = shell.info().await;

        assert_eq!(info.name, "test");
        assert_eq!(info.state, ocr_studio_protocol::SessionState::NoImage);
        assert!(info.image.is_none());
        assert!(info.loaded_models.is_empty());
        assert_eq!(info.pid, std::process::id());
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let (shell, _fatal_rx, _dir) = shell_with(Some(FakeModel::text("x")));
        let mut rx = shell.subscribe_view();

        shell.publish(&ViewMessage::error("boom"));
        let json = rx.recv().await.unwrap();
        assert_eq!(json, r#"{"type":"error","message":"boom"}"#);
    }

    #[tokio::test]
    async fn test_report_fatal_queues_once() {
        let (shell, mut fatal_rx, _dir) = shell_with(None);
        shell.report_fatal("first");
        shell.report_fatal("second");

        assert_eq!(fatal_rx.recv().await.as_deref(), Some("first"));
        assert!(fatal_rx.try_recv().is_err());
    }
}
