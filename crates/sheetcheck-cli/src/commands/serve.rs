//! `sheetcheck serve` - run the samplesheet upload endpoint.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use sheetcheck::{RuleSet, Validator};

use crate::server::{run_server, AppState};

/// Start the upload endpoint. Blocks until the server exits.
pub fn run(
    rules_path: &Path,
    port: u16,
    upload_dir: &Path,
    lims: bool,
) -> Result<bool, Box<dyn Error>> {
    let rules = RuleSet::load(rules_path)?;
    let mut engine = Validator::new(rules);
    if lims {
        engine = engine.with_env_lims();
    }

    std::fs::create_dir_all(upload_dir)?;
    let state = AppState::new(Arc::new(engine), upload_dir.to_path_buf());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(state, port))?;
    Ok(true)
}
