//! Cell command: dispatch a `%%command` cell through the registry.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use nbkit::core::{BackgroundCommand, CommandRegistry, ImportsCommand, Launcher, LaunchConfig, ScanOptions};

use crate::background::report;
use crate::resolver::{self, SessionArgs};

/// Execute the cell command.
pub async fn execute(
    file: Option<&Path>,
    notebook: Option<&Path>,
    session: &SessionArgs,
) -> anyhow::Result<()> {
    let cell_text = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let resolver = Arc::new(resolver::build(notebook, session)?);

    let mut registry = CommandRegistry::new();
    registry
        .register(BackgroundCommand::new(
            Arc::clone(&resolver),
            ScanOptions::default(),
            Launcher::new(LaunchConfig::from_env()),
        ))
        .register(ImportsCommand::new(resolver));

    let outcome = registry.dispatch(&cell_text).await?;
    report(&outcome);
    Ok(())
}
