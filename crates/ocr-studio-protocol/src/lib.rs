//! Protocol types for ocr-studio IPC communication.
//!
//! This crate defines the request and response types exchanged between the
//! CLI, the browser view and the daemon, plus the model selector shared by
//! all of them.

mod model;
mod request;
mod response;

pub use model::*;
pub use request::*;
pub use response::*;
