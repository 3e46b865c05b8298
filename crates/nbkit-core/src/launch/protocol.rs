//! Handoff protocol between the launcher and the `nbkit-runner` process.
//!
//! Uses length-prefixed JSON messages over the runner's stdin/stdout.
//! Format: 4-byte length (u32 LE) + JSON-encoded message.

use std::io::{Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest accepted message body.
const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Command sent from the launcher to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerCommand {
    /// Start the interpreter on a script, then own the script file.
    Launch {
        /// Resolved interpreter path.
        interpreter: PathBuf,
        /// Arguments placed before the script path.
        args: Vec<String>,
        /// The script to run; deleted by the runner once the interpreter exits.
        script: PathBuf,
        /// Working directory for the interpreter.
        working_dir: PathBuf,
        /// Append interpreter stdout/stderr here; discarded when unset.
        log_path: Option<PathBuf>,
    },
}

/// Response sent from the runner to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerResponse {
    /// The interpreter is running; the runner now owns the script file.
    Started {
        /// Interpreter process id.
        pid: u32,
    },

    /// The interpreter could not be started; the script is untouched.
    Failed {
        /// Error message.
        message: String,
    },
}

/// Write a message using length-prefixed JSON encoding.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let bytes = serde_json::to_vec(message)
        .map_err(|e| Error::Serialization(format!("Failed to encode runner message: {}", e)))?;

    let len = bytes.len() as u32;
    writer
        .write_all(&len.to_le_bytes())
        .map_err(|e| Error::Ipc(format!("Failed to write runner message length: {}", e)))?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::Ipc(format!("Failed to write runner message body: {}", e)))?;
    writer
        .flush()
        .map_err(|e| Error::Ipc(format!("Failed to flush runner stream: {}", e)))?;

    Ok(())
}

/// Read a message using length-prefixed JSON encoding.
pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut len_bytes = [0u8; 4];
    reader
        .read_exact(&mut len_bytes)
        .map_err(|e| Error::Ipc(format!("Failed to read runner message length: {}", e)))?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_MESSAGE_LEN {
        return Err(Error::Ipc(format!("Runner message too large: {} bytes", len)));
    }

    let mut bytes = vec![0u8; len];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| Error::Ipc(format!("Failed to read runner message body: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Serialization(format!("Failed to decode runner message: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_launch_command_frame() {
        let cmd = RunnerCommand::Launch {
            interpreter: PathBuf::from("/usr/bin/python3"),
            args: vec!["-u".to_string()],
            script: PathBuf::from("/work/.nbkit-abc.py"),
            working_dir: PathBuf::from("/work"),
            log_path: None,
        };

        let mut buf = Vec::new();
        write_message(&mut buf, &cmd).unwrap();

        let body_len = u32::from_le_bytes(buf[..4].try_into().unwrap()) as usize;
        assert_eq!(body_len, buf.len() - 4);
        assert!(String::from_utf8_lossy(&buf[4..]).contains(r#""type":"launch""#));

        let decoded: RunnerCommand = read_message(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_truncated_message() {
        let mut buf = Vec::new();
        write_message(&mut buf, &RunnerResponse::Started { pid: 7 }).unwrap();
        buf.truncate(buf.len() - 1);

        let result: Result<RunnerResponse> = read_message(&mut Cursor::new(buf));
        assert!(matches!(result, Err(Error::Ipc(_))));
    }

    #[test]
    fn test_empty_stream() {
        let result: Result<RunnerResponse> = read_message(&mut Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Ipc(_))));
    }

    #[test]
    fn test_oversized_message_rejected() {
        let mut buf = ((MAX_MESSAGE_LEN + 1) as u32).to_le_bytes().to_vec();
        buf.extend_from_slice(b"{}");

        let result: Result<RunnerResponse> = read_message(&mut Cursor::new(buf));
        assert!(matches!(result, Err(Error::Ipc(msg)) if msg.contains("too large")));
    }

    #[test]
    fn test_garbage_body() {
        let mut buf = 3u32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"???");

        let result: Result<RunnerResponse> = read_message(&mut Cursor::new(buf));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
