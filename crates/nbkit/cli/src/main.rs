//! nbkit CLI - run a Jupyter notebook's code in the background.

mod background;
mod cell;
mod colors;
mod extract;
mod imports;
mod resolver;
mod servers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resolver::SessionArgs;

#[derive(Parser)]
#[command(name = "nbkit")]
#[command(about = "Run a Jupyter notebook's code in the background")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notebook up to its %%background cell in a detached process
    Background {
        /// Path to the notebook (.ipynb); found from the running kernel when omitted
        notebook: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,

        /// Stop after this cell (0-based) instead of at the %%background cell
        #[arg(long)]
        until_cell: Option<usize>,

        /// Interpreter to run the program with (default: $NBKIT_INTERPRETER or python)
        #[arg(long)]
        interpreter: Option<String>,

        /// Append the program's output to this file (discarded otherwise)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Print the program instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the program a background run would execute
    Extract {
        /// Path to the notebook (.ipynb)
        notebook: PathBuf,

        /// Stop after this cell (0-based) instead of at the %%background cell
        #[arg(long)]
        until_cell: Option<usize>,
    },

    /// List the notebook's import statements
    Imports {
        /// Path to the notebook (.ipynb)
        notebook: PathBuf,

        /// Only the imports a source file uses
        #[arg(long = "for", value_name = "FILE")]
        for_file: Option<PathBuf>,
    },

    /// Run a %%command cell read from stdin or a file
    Cell {
        /// Read the cell from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Path to the notebook (.ipynb); found from the running kernel when omitted
        #[arg(long)]
        notebook: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// List running notebook servers
    Servers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging. Stdout carries program text for `extract`, so logs
    // go to stderr.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format nbkit errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(nbkit_err) = err.downcast_ref::<nbkit::core::Error>() {
            anyhow::anyhow!("{}", nbkit_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Background {
            notebook,
            session,
            until_cell,
            interpreter,
            log,
            dry_run,
        } => {
            let options = background::Options {
                until_cell,
                interpreter,
                log,
                dry_run,
            };
            background::execute(notebook.as_deref(), &session, &options)
                .await
                .map_err(format_error)?;
        }

        Commands::Extract {
            notebook,
            until_cell,
        } => extract::execute(&notebook, until_cell).map_err(format_error)?,

        Commands::Imports { notebook, for_file } => {
            imports::execute(&notebook, for_file.as_deref()).map_err(format_error)?;
        }

        Commands::Cell {
            file,
            notebook,
            session,
        } => {
            cell::execute(file.as_deref(), notebook.as_deref(), &session)
                .await
                .map_err(format_error)?;
        }

        Commands::Servers => servers::execute().await.map_err(format_error)?,
    }

    Ok(())
}
