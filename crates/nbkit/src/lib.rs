//! nbkit: run a Jupyter notebook's code in the background.
//!
//! nbkit finds the notebook behind a running kernel, rebuilds a standalone
//! program from its code cells up to the one being run, and starts that
//! program as a detached process:
//!
//! ```text
//! %%background          ──► cells 0..=n, magics removed ──► python .nbkit-xxxx.py
//! b = train(a)                                              (keeps running after
//!                                                            the kernel moves on)
//! ```
//!
//! The `nbkit` binary wraps this for use from a notebook shell escape
//! (`!nbkit background`) or a terminal (`nbkit background analysis.ipynb`).
//!
//! # Library use
//!
//! ```rust,ignore
//! use nbkit::prelude::*;
//!
//! let resolver = FixedPathResolver::new("analysis.ipynb");
//! let launcher = Launcher::new(LaunchConfig::from_env());
//! match run_in_background(&resolver, &ScanOptions::default(), &launcher).await? {
//!     CommandOutcome::Launched(report) => println!("pid {}", report.pid),
//!     CommandOutcome::NothingToRun => println!("nothing to run"),
//!     CommandOutcome::Text(text) => println!("{}", text),
//! }
//! ```

pub use nbkit_core as core;
pub use nbkit_ipynb as ipynb;
pub use nbkit_session as session;

pub mod prelude {
    //! Common imports.
    //!
    //! ```rust,ignore
    //! use nbkit::prelude::*;
    //! ```

    pub use nbkit_core::{
        BackgroundCommand, CellCommand, CommandOutcome, CommandRegistry, Error, FixedPathResolver,
        ImportsCommand, LaunchConfig, Launcher, ResolverChain, ScanOptions, SessionResolver,
        extract_program, prepare_run, run_in_background,
    };
    pub use nbkit_ipynb::{Cell, CellType, Notebook};
    pub use nbkit_session::{KernelSessionResolver, RuntimeDirs, SessionNameResolver};
}
