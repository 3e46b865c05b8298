//! `SessionResolver` implementations for Jupyter.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use nbkit_core::{Result, SessionResolver};

use crate::connection::kernel_id_from_connection_file;
use crate::error::SessionResult;
use crate::runtime::RuntimeDirs;
use crate::servers::list_running_servers;
use crate::sessions::{SessionsClient, find_notebook};

/// Finds the notebook of a kernel by asking every running server.
#[derive(Debug, Clone)]
pub struct KernelSessionResolver {
    kernel_id: String,
    runtime: RuntimeDirs,
    client: SessionsClient,
}

impl KernelSessionResolver {
    /// Resolve for a known kernel id.
    pub fn new(kernel_id: impl Into<String>) -> Self {
        Self {
            kernel_id: kernel_id.into(),
            runtime: RuntimeDirs::from_env(),
            client: SessionsClient::new(),
        }
    }

    /// Resolve for the kernel owning a connection file.
    pub fn from_connection_file(path: &Path) -> SessionResult<Self> {
        Ok(Self::new(kernel_id_from_connection_file(path)?))
    }

    /// Look for server info files in another runtime directory.
    pub fn with_runtime(mut self, runtime: RuntimeDirs) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn kernel_id(&self) -> &str {
        &self.kernel_id
    }

    async fn lookup(&self) -> Option<PathBuf> {
        let servers = list_running_servers(&self.runtime.runtime_dir);
        if servers.is_empty() {
            tracing::debug!(
                "No notebook servers found in {}",
                self.runtime.runtime_dir.display()
            );
            return None;
        }

        for server in &servers {
            match self.client.list_sessions(server).await {
                Ok(sessions) => {
                    if let Some(path) = find_notebook(server, &sessions, &self.kernel_id) {
                        return Some(path);
                    }
                }
                // One unreachable server must not hide a match on another.
                Err(e) => tracing::warn!("Skipping server {}: {}", server.url, e),
            }
        }

        tracing::debug!(
            "Kernel {} not listed by any of {} servers",
            self.kernel_id,
            servers.len()
        );
        None
    }
}

impl SessionResolver for KernelSessionResolver {
    fn name(&self) -> &str {
        "kernel"
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        async move { Ok(self.lookup().await) }.boxed()
    }
}

/// Uses the notebook path recent Jupyter servers export to kernels as
/// `JPY_SESSION_NAME`.
#[derive(Debug, Clone, Default)]
pub struct SessionNameResolver {
    session_name: Option<PathBuf>,
}

impl SessionNameResolver {
    pub fn new(session_name: Option<PathBuf>) -> Self {
        Self { session_name }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var_os("JPY_SESSION_NAME").map(PathBuf::from))
    }
}

impl SessionResolver for SessionNameResolver {
    fn name(&self) -> &str {
        "session-name"
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        // Only trust the variable when it names a notebook that exists; some
        // front-ends put a display name there instead of a path.
        let found = self
            .session_name
            .as_ref()
            .filter(|path| path.is_file())
            .map(std::path::absolute)
            .transpose();
        async move { Ok(found?) }.boxed()
    }
}
