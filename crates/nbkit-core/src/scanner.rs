//! Cell source scanner.
//!
//! Builds a standalone program from a notebook by walking its cells in
//! document order:
//!
//! ```text
//! markdown / empty code cell ──► skipped
//! %%other first line         ──► whole cell skipped
//! %%background first line    ──► first line dropped, rest kept, scan stops
//! `!nbkit background` line   ──► that line dropped, rest kept, scan stops
//! plain code cell            ──► kept
//!
//! kept lines starting with `%` are dropped; every kept line ends with `\n`
//! ```

use nbkit_ipynb::Notebook;

use crate::directive::{CellDirective, is_line_command, is_shell_invocation};

/// Name of the command that runs code in the background.
pub const DEFAULT_COMMAND: &str = "background";

/// Options for a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Name of the cell command doing the scan. Its cell is the last one read.
    pub own_command: String,
    /// Stop after this cell index even if no own-command cell is found.
    pub until_cell: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            own_command: DEFAULT_COMMAND.to_string(),
            until_cell: None,
        }
    }
}

impl ScanOptions {
    /// Scan on behalf of a differently named command.
    pub fn with_command(mut self, name: impl Into<String>) -> Self {
        self.own_command = name.into();
        self
    }

    /// Stop after the given 0-based cell index.
    pub fn until_cell(mut self, index: usize) -> Self {
        self.until_cell = Some(index);
        self
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// Every cell was visited.
    EndOfDocument,
    /// Stopped after the own-command cell at this index.
    OwnCommand(usize),
    /// Stopped after the cell limit at this index.
    CellLimit(usize),
}

/// The program built from a notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedProgram {
    /// Program source, one `\n`-terminated line per kept line.
    pub source: String,
    /// Code cells whose lines were read.
    pub cells_included: usize,
    /// Code cells skipped because of a foreign cell command.
    pub cells_skipped: usize,
    /// Why the scan stopped.
    pub end: ScanEnd,
}

impl ExtractedProgram {
    /// Whether there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Extract the program from a notebook.
pub fn extract_program(notebook: &Notebook, options: &ScanOptions) -> ExtractedProgram {
    let mut source = String::new();
    let mut cells_included = 0;
    let mut cells_skipped = 0;
    let mut end = ScanEnd::EndOfDocument;

    for (index, cell) in notebook.cells.iter().enumerate() {
        if options.until_cell.is_some_and(|limit| index > limit) {
            end = ScanEnd::CellLimit(index - 1);
            break;
        }

        let lines = cell.source.lines();
        let Some(first) = lines.first() else {
            continue;
        };
        if !cell.is_code() {
            continue;
        }

        let invokes = |line: &String| is_shell_invocation(line, &options.own_command);
        let (body, own) = match CellDirective::classify(first, &options.own_command) {
            CellDirective::None => (lines, lines.iter().any(invokes)),
            CellDirective::Own(_) => (&lines[1..], true),
            CellDirective::Other(command) => {
                tracing::debug!("Skipping cell {} (%%{})", index, command.name);
                cells_skipped += 1;
                continue;
            }
        };

        for line in body
            .iter()
            .filter(|line| !is_line_command(line) && !invokes(*line))
        {
            push_line(&mut source, line);
        }
        cells_included += 1;

        if own {
            end = ScanEnd::OwnCommand(index);
            break;
        }
    }

    ExtractedProgram {
        source,
        cells_included,
        cells_skipped,
        end,
    }
}

/// Append a line, normalising its terminator to a single `\n`.
fn push_line(out: &mut String, line: &str) {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    out.push_str(line);
    out.push('\n');
}
