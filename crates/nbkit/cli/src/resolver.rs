//! Building the notebook resolver from command-line flags.

use std::path::{Path, PathBuf};

use clap::Args;
use nbkit::core::{FixedPathResolver, ResolverChain};
use nbkit::session::{KernelSessionResolver, SessionNameResolver, find_connection_file};

/// Flags that identify the kernel whose notebook to use.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Kernel connection file (kernel-<id>.json)
    #[arg(long, value_name = "FILE", conflicts_with = "kernel_id")]
    pub connection_file: Option<PathBuf>,

    /// Kernel id as listed by the notebook server
    #[arg(long, value_name = "ID")]
    pub kernel_id: Option<String>,
}

/// Build the resolver chain.
///
/// An explicit notebook path wins outright. Otherwise an explicit kernel is
/// looked up on the running servers; with no flags at all the notebook comes
/// from `JPY_SESSION_NAME` or from the kernel this process was started by.
pub fn build(notebook: Option<&Path>, session: &SessionArgs) -> anyhow::Result<ResolverChain> {
    if let Some(notebook) = notebook {
        return Ok(ResolverChain::new().push(FixedPathResolver::new(notebook)));
    }

    if let Some(kernel_id) = &session.kernel_id {
        return Ok(ResolverChain::new().push(KernelSessionResolver::new(kernel_id.as_str())));
    }

    if let Some(connection_file) = &session.connection_file {
        let resolver = KernelSessionResolver::from_connection_file(connection_file)?;
        return Ok(ResolverChain::new().push(resolver));
    }

    let mut chain = ResolverChain::new().push(SessionNameResolver::from_env());
    match find_connection_file() {
        Some(connection_file) => {
            let resolver = KernelSessionResolver::from_connection_file(&connection_file)?;
            tracing::debug!("Running under kernel {}", resolver.kernel_id());
            chain = chain.push(resolver);
        }
        None => tracing::debug!("Not running under a Jupyter kernel"),
    }
    Ok(chain)
}
