//! Jupyter runtime directory discovery.
//!
//! Running servers drop `jpserver-<pid>.json` (jupyter_server) or
//! `nbserver-<pid>.json` (classic notebook) info files into the runtime
//! directory:
//!
//! ```text
//! $JUPYTER_RUNTIME_DIR                    if set
//! $JUPYTER_DATA_DIR/runtime               if set
//! <platform jupyter data dir>/runtime     otherwise
//!   Linux    $XDG_DATA_HOME/jupyter  (~/.local/share/jupyter)
//!   macOS    ~/Library/Jupyter
//!   Windows  %APPDATA%\jupyter
//! ```

use std::path::PathBuf;

/// Jupyter directories used for server discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDirs {
    /// Directory holding server and kernel info files.
    pub runtime_dir: PathBuf,
}

impl RuntimeDirs {
    /// Use an explicit runtime directory.
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
        }
    }

    /// Resolve the runtime directory from the environment.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os("JUPYTER_RUNTIME_DIR").map(PathBuf::from),
            std::env::var_os("JUPYTER_DATA_DIR").map(PathBuf::from),
        )
    }

    fn from_vars(runtime_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        if let Some(runtime_dir) = runtime_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            return Self::new(runtime_dir);
        }
        let data_dir = data_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(platform_data_dir);
        Self::new(data_dir.join("runtime"))
    }
}

impl Default for RuntimeDirs {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Jupyter's per-user data directory for this platform.
fn platform_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Library")
            .join("Jupyter")
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jupyter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_dir_wins() {
        let dirs = RuntimeDirs::from_vars(
            Some(PathBuf::from("/rt")),
            Some(PathBuf::from("/data")),
        );
        assert_eq!(dirs.runtime_dir, PathBuf::from("/rt"));
    }

    #[test]
    fn test_data_dir_fallback() {
        let dirs = RuntimeDirs::from_vars(None, Some(PathBuf::from("/data")));
        assert_eq!(dirs.runtime_dir, PathBuf::from("/data/runtime"));
    }

    #[test]
    fn test_empty_vars_ignored() {
        let dirs = RuntimeDirs::from_vars(Some(PathBuf::new()), None);
        assert!(dirs.runtime_dir.ends_with("runtime"));
        assert_ne!(dirs.runtime_dir, PathBuf::from("runtime"));
    }

    #[test]
    fn test_platform_default_ends_in_jupyter_runtime() {
        let dirs = RuntimeDirs::from_vars(None, None);
        let parent = dirs.runtime_dir.parent().unwrap();
        assert!(parent.ends_with("jupyter") || parent.ends_with("Jupyter"));
    }
}
