//! Kernel connection files.
//!
//! Every Jupyter kernel is started with `-f <runtime>/kernel-<id>.json`. The
//! id in that file name is the one the server lists in its sessions.

use std::path::{Path, PathBuf};

use sysinfo::{Pid, System};

use crate::error::{SessionError, SessionResult};

/// How many parent processes to inspect when looking for the kernel.
const MAX_ANCESTORS: usize = 8;

/// Extract the kernel id from a connection file path.
pub fn kernel_id_from_connection_file(path: &Path) -> SessionResult<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SessionError::ConnectionFile(path.display().to_string()))?;

    file_name
        .strip_prefix("kernel-")
        .and_then(|rest| rest.strip_suffix(".json"))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SessionError::ConnectionFile(path.display().to_string()))
}

/// Find a connection file argument in a kernel command line.
///
/// Accepts `-f <file>`, `-f=<file>`, `--f=<file>` and a bare path.
pub fn connection_file_from_args(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .map(|arg| {
            arg.strip_prefix("--f=")
                .or_else(|| arg.strip_prefix("-f="))
                .unwrap_or(arg)
        })
        .map(PathBuf::from)
        .find(|path| kernel_id_from_connection_file(path).is_ok())
}

/// Find the connection file of the kernel this process was started from.
///
/// A shell escape in a notebook (`!nbkit background`) runs as a descendant of
/// the kernel, so the kernel's command line is a few parents up.
pub fn find_connection_file() -> Option<PathBuf> {
    let mut system = System::new();
    system.refresh_processes();

    let mut pid: Pid = sysinfo::get_current_pid().ok()?;
    for _ in 0..MAX_ANCESTORS {
        let parent = system.process(pid)?.parent()?;
        let process = system.process(parent)?;
        if let Some(path) = connection_file_from_args(process.cmd()) {
            tracing::debug!("Found kernel connection file {} in pid {}", path.display(), parent);
            return Some(path);
        }
        pid = parent;
    }

    None
}
