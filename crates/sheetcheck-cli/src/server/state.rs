//! Shared state for the upload endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use sheetcheck::Validator;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The validation engine; rules are loaded once at startup.
    pub validator: Arc<Validator>,
    /// Directory where uploaded sheets are staged.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Create state for the server.
    pub fn new(validator: Arc<Validator>, upload_dir: PathBuf) -> Self {
        Self {
            validator,
            upload_dir,
        }
    }
}
