//! Command handlers for session operations.

pub mod highlight;
pub mod model;
pub mod ocr;
pub mod upload;
