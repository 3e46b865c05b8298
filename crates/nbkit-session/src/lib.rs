//! Jupyter session lookup for nbkit.
//!
//! Finds the notebook a kernel belongs to:
//!
//! ```text
//! kernel-<id>.json ──► kernel id ─┐
//!                                 ├─► GET <server>/api/sessions ──► root_dir / notebook.path
//! runtime dir ──► jpserver-*.json ┘
//! ```

mod connection;
mod error;
mod resolver;
mod runtime;
mod servers;
mod sessions;

pub use connection::{connection_file_from_args, find_connection_file, kernel_id_from_connection_file};
pub use error::{SessionError, SessionResult};
pub use resolver::{KernelSessionResolver, SessionNameResolver};
pub use runtime::RuntimeDirs;
pub use servers::{ServerInfo, list_running_servers};
pub use sessions::{KernelRef, NotebookRef, SessionRecord, SessionsClient, find_notebook};
