//! Running notebook server discovery.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Info file prefixes written by jupyter_server and the classic notebook.
const SERVER_FILE_PREFIXES: [&str; 2] = ["jpserver-", "nbserver-"];

/// A running notebook server, as described by its runtime info file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Base URL, usually with a trailing slash (`http://localhost:8888/`).
    pub url: String,

    /// Access token; empty when the server has none.
    #[serde(default)]
    pub token: String,

    /// Root directory (jupyter_server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,

    /// Root directory (classic notebook).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_dir: Option<PathBuf>,

    /// Server process id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl ServerInfo {
    /// Directory that session notebook paths are relative to.
    pub fn root(&self) -> Option<&Path> {
        self.root_dir.as_deref().or(self.notebook_dir.as_deref())
    }

    /// URL of the sessions listing endpoint.
    pub fn sessions_url(&self) -> String {
        format!("{}/api/sessions", self.url.trim_end_matches('/'))
    }

    /// Read a server info file.
    pub fn read_from_file(path: &Path) -> SessionResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// List the servers whose info files are in `runtime_dir`.
///
/// Files that cannot be read or parsed are skipped; a missing runtime
/// directory simply means no servers. Info files of servers that have since
/// died are still returned and show up as unreachable when queried.
pub fn list_running_servers(runtime_dir: &Path) -> Vec<ServerInfo> {
    let entries = match fs::read_dir(runtime_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot read runtime dir {}: {}", runtime_dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| is_server_file(path))
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match ServerInfo::read_from_file(path) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!("Skipping server file {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

fn is_server_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".json") && SERVER_FILE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_jupyter_server_file() {
        let info: ServerInfo = serde_json::from_str(
            r#"{"base_url": "/", "hostname": "localhost", "password": false, "pid": 4242,
                "port": 8888, "root_dir": "/home/me/work", "secure": false, "sock": "",
                "token": "abc123", "url": "http://localhost:8888/", "version": "2.14.0"}"#,
        )
        .unwrap();

        assert_eq!(info.root(), Some(Path::new("/home/me/work")));
        assert_eq!(info.token, "abc123");
        assert_eq!(info.pid, Some(4242));
        assert_eq!(info.sessions_url(), "http://localhost:8888/api/sessions");
    }

    #[test]
    fn test_parse_classic_notebook_file() {
        let info: ServerInfo = serde_json::from_str(
            r#"{"url": "http://localhost:8889/lab", "notebook_dir": "/srv/nb", "token": ""}"#,
        )
        .unwrap();

        assert_eq!(info.root(), Some(Path::new("/srv/nb")));
        assert_eq!(info.sessions_url(), "http://localhost:8889/lab/api/sessions");
    }

    #[test]
    fn test_list_running_servers() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(
            dir.join("jpserver-10.json"),
            r#"{"url": "http://localhost:8888/", "root_dir": "/a", "token": "t"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("nbserver-20.json"),
            r#"{"url": "http://localhost:8890/", "notebook_dir": "/b"}"#,
        )
        .unwrap();
        fs::write(dir.join("jpserver-30.json"), "not json").unwrap();
        fs::write(dir.join("kernel-abc.json"), r#"{"url": "x"}"#).unwrap();
        fs::write(dir.join("jpserver-10-open.html"), "<html>").unwrap();

        let servers = list_running_servers(dir);
        let urls: Vec<&str> = servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["http://localhost:8888/", "http://localhost:8890/"]);
    }

    #[test]
    fn test_missing_runtime_dir() {
        let temp = TempDir::new().unwrap();
        assert!(list_running_servers(&temp.path().join("nope")).is_empty());
    }
}
