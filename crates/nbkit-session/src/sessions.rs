//! Notebook server sessions API client.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};
use crate::servers::ServerInfo;

/// One entry of `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id.
    #[serde(default)]
    pub id: String,

    /// Document path relative to the server root (jupyter_server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// The kernel attached to the session; null while it starts or after it
    /// died.
    #[serde(default)]
    pub kernel: Option<KernelRef>,

    /// Document reference (classic notebook, still sent by jupyter_server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook: Option<NotebookRef>,
}

/// Kernel part of a session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Notebook part of a session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRef {
    pub path: String,
    #[serde(default)]
    pub name: String,
}

impl SessionRecord {
    /// Id of the attached kernel, if any.
    pub fn kernel_id(&self) -> Option<&str> {
        self.kernel.as_ref().map(|kernel| kernel.id.as_str())
    }

    /// Notebook path relative to the server root.
    pub fn notebook_path(&self) -> Option<&str> {
        self.notebook
            .as_ref()
            .map(|notebook| notebook.path.as_str())
            .or(self.path.as_deref())
    }
}

/// Find the notebook attached to `kernel_id` among a server's sessions.
pub fn find_notebook(
    server: &ServerInfo,
    sessions: &[SessionRecord],
    kernel_id: &str,
) -> Option<PathBuf> {
    let session = sessions
        .iter()
        .find(|session| session.kernel_id() == Some(kernel_id))?;
    let relative = session.notebook_path()?;
    let Some(root) = server.root() else {
        tracing::debug!("Server {} has no root directory", server.url);
        return None;
    };
    Some(root.join(relative))
}

/// Queries the sessions endpoint of notebook servers.
#[derive(Debug, Clone)]
pub struct SessionsClient {
    http: reqwest::Client,
}

impl SessionsClient {
    /// Create a client. Servers are always local, so system proxies are
    /// bypassed.
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { http }
    }

    /// List a server's sessions.
    ///
    /// The token goes both in the query string and the `Authorization`
    /// header, which covers old and new servers.
    pub async fn list_sessions(&self, server: &ServerInfo) -> SessionResult<Vec<SessionRecord>> {
        let url = server.sessions_url();
        let mut request = self.http.get(&url);
        if !server.token.is_empty() {
            request = request
                .query(&[("token", server.token.as_str())])
                .header(reqwest::header::AUTHORIZATION, format!("token {}", server.token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let sessions: Vec<SessionRecord> = response.json().await?;
        tracing::debug!("{} lists {} sessions", url, sessions.len());
        Ok(sessions)
    }
}

impl Default for SessionsClient {
    fn default() -> Self {
        Self::new()
    }
}
