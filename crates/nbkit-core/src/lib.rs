//! Core engine for nbkit.
//!
//! This crate provides:
//! - Cell directive parsing and the cell source scanner
//! - Import statement discovery
//! - The `SessionResolver` seam used to locate the current notebook
//! - The background launcher and its runner handoff protocol
//! - The cell command registry

pub mod background;
pub mod directive;
pub mod error;
pub mod imports;
pub mod launch;
pub mod registry;
pub mod resolve;
pub mod scanner;

pub use background::{BackgroundCommand, ImportsCommand, PreparedRun, prepare_run, run_in_background};
pub use directive::{CellDirective, CommandLine};
pub use error::{Error, Result};
pub use imports::{ImportStatement, collect_imports, imports_needed};
pub use launch::{LaunchConfig, LaunchReport, Launcher, find_runner_binary};
pub use registry::{CellCommand, CellInvocation, CommandOutcome, CommandRegistry};
pub use resolve::{FixedPathResolver, ResolverChain, SessionResolver};
pub use scanner::{ExtractedProgram, ScanEnd, ScanOptions, extract_program};
