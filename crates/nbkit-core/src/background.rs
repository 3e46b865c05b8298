//! Running a notebook's code in the background.
//!
//! Ties the pieces together: resolve the notebook, read it fresh, extract the
//! program and launch it from the notebook's own directory so relative paths
//! in the code keep working.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use nbkit_ipynb::Notebook;

use crate::error::{Error, Result};
use crate::imports::{collect_imports, imports_needed};
use crate::launch::Launcher;
use crate::registry::{CellCommand, CellInvocation, CommandOutcome};
use crate::resolve::SessionResolver;
use crate::scanner::{ExtractedProgram, ScanOptions, extract_program};

/// A notebook located and scanned, ready to launch.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Absolute notebook path.
    pub notebook_path: PathBuf,
    /// The program to run.
    pub program: ExtractedProgram,
}

impl PreparedRun {
    /// Directory the program runs from.
    pub fn working_dir(&self) -> &Path {
        self.notebook_path.parent().unwrap_or(Path::new("."))
    }

    /// Launch the program, or report that there is nothing to run.
    pub fn launch(&self, launcher: &Launcher) -> Result<CommandOutcome> {
        if self.program.is_empty() {
            tracing::info!("Nothing to run in {}", self.notebook_path.display());
            return Ok(CommandOutcome::NothingToRun);
        }

        let report = launcher.launch(&self.program.source, self.working_dir())?;
        Ok(CommandOutcome::Launched(report))
    }
}

/// Resolve the notebook and extract its program.
///
/// Fails with [`Error::NotebookNotFound`] before touching any file if the
/// resolver finds nothing.
pub async fn prepare_run<R>(resolver: &R, scan: &ScanOptions) -> Result<PreparedRun>
where
    R: SessionResolver + ?Sized,
{
    let notebook_path = resolver.resolve().await?.ok_or(Error::NotebookNotFound)?;
    let notebook = Notebook::read_from_file(&notebook_path)?;
    let program = extract_program(&notebook, scan);

    tracing::debug!(
        "Extracted {} bytes from {} cells of {} ({} skipped, {:?})",
        program.source.len(),
        program.cells_included,
        notebook_path.display(),
        program.cells_skipped,
        program.end
    );

    Ok(PreparedRun {
        notebook_path,
        program,
    })
}

/// Resolve, extract and launch in one go.
pub async fn run_in_background<R>(
    resolver: &R,
    scan: &ScanOptions,
    launcher: &Launcher,
) -> Result<CommandOutcome>
where
    R: SessionResolver + ?Sized,
{
    prepare_run(resolver, scan).await?.launch(launcher)
}

/// `%%background`: run every cell up to this one, plus this cell's body, in a
/// separate process.
pub struct BackgroundCommand<R> {
    resolver: R,
    scan: ScanOptions,
    launcher: Launcher,
}

impl<R: SessionResolver> BackgroundCommand<R> {
    pub fn new(resolver: R, scan: ScanOptions, launcher: Launcher) -> Self {
        Self {
            resolver,
            scan,
            launcher,
        }
    }
}

impl<R: SessionResolver> CellCommand for BackgroundCommand<R> {
    fn name(&self) -> &str {
        &self.scan.own_command
    }

    fn summary(&self) -> &str {
        "Run the notebook up to and including this cell in a background process"
    }

    fn invoke<'a>(&'a self, _invocation: &'a CellInvocation) -> BoxFuture<'a, Result<CommandOutcome>> {
        // The cell body is read back from the saved notebook, not from the
        // invocation, so it is only as current as the last save.
        run_in_background(&self.resolver, &self.scan, &self.launcher).boxed()
    }
}

/// `%%imports`: list the notebook's import statements this cell's body uses.
/// An empty body lists them all.
pub struct ImportsCommand<R> {
    resolver: R,
}

impl<R: SessionResolver> ImportsCommand<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

impl<R: SessionResolver> CellCommand for ImportsCommand<R> {
    fn name(&self) -> &str {
        "imports"
    }

    fn summary(&self) -> &str {
        "List the notebook imports used by this cell"
    }

    fn invoke<'a>(&'a self, invocation: &'a CellInvocation) -> BoxFuture<'a, Result<CommandOutcome>> {
        async move {
            let path = self.resolver.resolve().await?.ok_or(Error::NotebookNotFound)?;
            let notebook = Notebook::read_from_file(&path)?;
            let imports = collect_imports(&notebook);

            let lines: Vec<&str> = if invocation.body.trim().is_empty() {
                imports.iter().map(|s| s.line.as_str()).collect()
            } else {
                imports_needed(&imports, &invocation.body)
                    .into_iter()
                    .map(|s| s.line.as_str())
                    .collect()
            };

            Ok(CommandOutcome::Text(lines.join("\n")))
        }
        .boxed()
    }
}
