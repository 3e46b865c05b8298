//! Imports command: list a notebook's import statements.

use std::fs;
use std::path::Path;

use nbkit::core::{collect_imports, imports_needed};
use nbkit::ipynb::Notebook;

/// Execute the imports command.
pub fn execute(notebook_path: &Path, for_file: Option<&Path>) -> anyhow::Result<()> {
    let notebook = Notebook::read_from_file(notebook_path)?;
    let imports = collect_imports(&notebook);

    let lines: Vec<&str> = match for_file {
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            imports_needed(&imports, &source)
                .into_iter()
                .map(|statement| statement.line.as_str())
                .collect()
        }
        None => imports.iter().map(|statement| statement.line.as_str()).collect(),
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
