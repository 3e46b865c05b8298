//! Extract command: print the program a background run would execute.

use std::path::Path;

use nbkit::core::{ScanOptions, extract_program};
use nbkit::ipynb::Notebook;

/// Execute the extract command.
///
/// Only the program goes to stdout so it can be piped or redirected.
pub fn execute(notebook_path: &Path, until_cell: Option<usize>) -> anyhow::Result<()> {
    let notebook = Notebook::read_from_file(notebook_path)?;

    let mut scan = ScanOptions::default();
    if let Some(index) = until_cell {
        scan = scan.until_cell(index);
    }

    let program = extract_program(&notebook, &scan);
    tracing::debug!(
        "{} cells included, {} skipped, {:?}",
        program.cells_included,
        program.cells_skipped,
        program.end
    );

    print!("{}", program.source);
    Ok(())
}
