//! Locating the notebook behind the current session.
//!
//! How the notebook is found depends on the host (a Jupyter server, an
//! explicit path, ...). Everything downstream only sees a `SessionResolver`.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Result;

/// Finds the notebook document backing the current session.
pub trait SessionResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Resolve the absolute path of the notebook.
    ///
    /// `Ok(None)` means no notebook matched. That is an expected outcome
    /// (no server running, session not registered yet) and callers must
    /// handle it.
    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>>;
}

impl<T: SessionResolver + ?Sized> SessionResolver for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        (**self).resolve()
    }
}

impl<T: SessionResolver + ?Sized> SessionResolver for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        (**self).resolve()
    }
}

/// A notebook path given up front.
#[derive(Debug, Clone)]
pub struct FixedPathResolver {
    path: PathBuf,
}

impl FixedPathResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionResolver for FixedPathResolver {
    fn name(&self) -> &str {
        "path"
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        async move { Ok(Some(std::path::absolute(&self.path)?)) }.boxed()
    }
}

/// Tries resolvers in order; the first one to find a notebook wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn SessionResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver to the chain.
    pub fn push(mut self, resolver: impl SessionResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl SessionResolver for ResolverChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Option<PathBuf>>> {
        async move {
            for resolver in &self.resolvers {
                if let Some(path) = resolver.resolve().await? {
                    tracing::debug!("{} resolver found {}", resolver.name(), path.display());
                    return Ok(Some(path));
                }
                tracing::debug!("{} resolver found nothing", resolver.name());
            }
            Ok(None)
        }
        .boxed()
    }
}
