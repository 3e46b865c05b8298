//! Background command: run the notebook up to its %%background cell.

use std::path::{Path, PathBuf};

use nbkit::core::{CommandOutcome, LaunchConfig, Launcher, ScanEnd, ScanOptions, prepare_run};

use crate::colors;
use crate::resolver::{self, SessionArgs};

/// Flags of the `background` subcommand.
pub struct Options {
    pub until_cell: Option<usize>,
    pub interpreter: Option<String>,
    pub log: Option<PathBuf>,
    pub dry_run: bool,
}

/// Execute the background command.
pub async fn execute(
    notebook: Option<&Path>,
    session: &SessionArgs,
    options: &Options,
) -> anyhow::Result<()> {
    let resolver = resolver::build(notebook, session)?;

    let mut scan = ScanOptions::default();
    if let Some(index) = options.until_cell {
        scan = scan.until_cell(index);
    }

    let prepared = prepare_run(&resolver, &scan).await?;
    let program = &prepared.program;

    if options.dry_run {
        eprintln!(
            "{}{}{} cells from {} ({})",
            colors::DIM,
            program.cells_included,
            colors::RESET,
            prepared.notebook_path.display(),
            describe_end(&program.end)
        );
        print!("{}", program.source);
        return Ok(());
    }

    if program.is_empty() {
        report(&CommandOutcome::NothingToRun);
        return Ok(());
    }

    let mut config = LaunchConfig::from_env();
    if let Some(interpreter) = &options.interpreter {
        config = config.with_interpreter(interpreter.as_str());
    }
    if let Some(log) = &options.log {
        config = config.with_log_path(std::path::absolute(log)?);
    }

    print!(
        "{}Starting{} {} ({} cells)... ",
        colors::BOLD,
        colors::RESET,
        prepared.notebook_path.display(),
        program.cells_included
    );
    colors::flush_stdout();

    match prepared.launch(&Launcher::new(config)) {
        Ok(outcome) => {
            println!("{}✓{}", colors::GREEN, colors::RESET);
            report(&outcome);
            Ok(())
        }
        Err(e) => {
            println!("{}✗{}", colors::RED, colors::RESET);
            Err(e.into())
        }
    }
}

/// Print what a cell command did.
pub fn report(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Launched(report) => {
            println!(
                "  {}pid:{}    {}",
                colors::CYAN,
                colors::RESET,
                report.pid
            );
            println!(
                "  {}script:{} {}",
                colors::CYAN,
                colors::RESET,
                report.script_path.display()
            );
        }
        CommandOutcome::NothingToRun => {
            println!("{}Nothing to run{}", colors::YELLOW, colors::RESET);
        }
        CommandOutcome::Text(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
    }
}

fn describe_end(end: &ScanEnd) -> String {
    match end {
        ScanEnd::OwnCommand(index) => format!("stopped at cell {}", index),
        ScanEnd::CellLimit(index) => format!("stopped after cell {}", index),
        ScanEnd::EndOfDocument => "no %%background cell found".to_string(),
    }
}
