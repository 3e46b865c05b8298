//! Background launcher.
//!
//! Writes a program to a temporary script next to the notebook and starts it
//! through the `nbkit-runner` process:
//!
//! ```text
//! Launcher ──Launch{script}──► nbkit-runner ──spawn──► interpreter script
//!          ◄──Started{pid}────      │
//!   (releases script)               └─ waits, then deletes script
//! ```
//!
//! The script is only released once the runner reports that the interpreter
//! is running. From then on the runner owns it and removes it after the
//! interpreter exits, so the file outlives every reader. If anything fails
//! before that point the temporary file guard removes it.

pub mod protocol;

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::{Error, Result};

use protocol::{RunnerCommand, RunnerResponse, read_message, write_message};

/// Name of the runner binary.
pub const RUNNER_BINARY: &str = "nbkit-runner";

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python";

/// Launcher settings.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Interpreter program, looked up on PATH unless it is a path.
    pub interpreter: String,
    /// Arguments placed before the script path.
    pub interpreter_args: Vec<String>,
    /// Runner binary; found with [`find_runner_binary`] when unset.
    pub runner: Option<PathBuf>,
    /// Temporary script file name prefix.
    pub script_prefix: String,
    /// Temporary script file name suffix.
    pub script_suffix: String,
    /// Append the program's output to this file; discarded when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            interpreter_args: Vec::new(),
            runner: None,
            script_prefix: ".nbkit-".to_string(),
            script_suffix: ".py".to_string(),
            log_path: None,
        }
    }
}

impl LaunchConfig {
    /// Defaults overridden by `NBKIT_INTERPRETER` and `NBKIT_RUNNER_PATH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(interpreter) = std::env::var("NBKIT_INTERPRETER")
            && !interpreter.is_empty()
        {
            config.interpreter = interpreter;
        }
        if let Ok(runner) = std::env::var("NBKIT_RUNNER_PATH") {
            config.runner = Some(PathBuf::from(runner));
        }
        config
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_interpreter_args(mut self, args: Vec<String>) -> Self {
        self.interpreter_args = args;
        self
    }

    pub fn with_runner(mut self, runner: impl Into<PathBuf>) -> Self {
        self.runner = Some(runner.into());
        self
    }

    pub fn with_log_path(mut self, log_path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(log_path.into());
        self
    }
}

/// A started background run.
#[derive(Debug, Clone)]
pub struct LaunchReport {
    /// Interpreter process id.
    pub pid: u32,
    /// Script being run; removed by the runner when the interpreter exits.
    pub script_path: PathBuf,
    /// Resolved interpreter.
    pub interpreter: PathBuf,
}

/// Starts programs as detached background processes.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    config: LaunchConfig,
}

impl Launcher {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Start `program` in the background from `working_dir`.
    ///
    /// Returns once the interpreter is running; does not wait for it.
    pub fn launch(&self, program: &str, working_dir: &Path) -> Result<LaunchReport> {
        let interpreter = which::which(&self.config.interpreter).map_err(|e| {
            Error::InterpreterNotFound(format!("{}: {}", self.config.interpreter, e))
        })?;
        let runner = match &self.config.runner {
            Some(runner) => runner.clone(),
            None => find_runner_binary()?,
        };

        let mut script = tempfile::Builder::new()
            .prefix(&self.config.script_prefix)
            .suffix(&self.config.script_suffix)
            .tempfile_in(working_dir)?;
        script.write_all(program.as_bytes())?;
        script.flush()?;
        let script = script.into_temp_path();

        let command = RunnerCommand::Launch {
            interpreter: interpreter.clone(),
            args: self.config.interpreter_args.clone(),
            script: script.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            log_path: self.config.log_path.clone(),
        };

        // On error `script` is dropped here, which deletes it.
        let pid = hand_off(&runner, &command)?;

        let script_path = script
            .keep()
            .map_err(|e| Error::Launch(format!("Failed to release script to runner: {}", e)))?;

        tracing::info!(
            "Started {} {} in background (pid {})",
            interpreter.display(),
            script_path.display(),
            pid
        );

        Ok(LaunchReport {
            pid,
            script_path,
            interpreter,
        })
    }
}

/// Spawn the runner, send it the launch command and wait for its verdict.
fn hand_off(runner: &Path, command: &RunnerCommand) -> Result<u32> {
    // The runner outlives this call and must not keep the caller's stderr open.
    let mut child = Command::new(runner)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            Error::Launch(format!(
                "Failed to spawn runner '{}': {}",
                runner.display(),
                e
            ))
        })?;

    let response = exchange(&mut child, command);

    match response {
        Ok(RunnerResponse::Started { pid }) => {
            reap_in_background(child);
            Ok(pid)
        }
        Ok(RunnerResponse::Failed { message }) => {
            let _ = child.wait();
            Err(Error::Launch(message))
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(e)
        }
    }
}

fn exchange(child: &mut Child, command: &RunnerCommand) -> Result<RunnerResponse> {
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::Ipc("Failed to get runner stdin".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Ipc("Failed to get runner stdout".to_string()))?;

    let mut writer = BufWriter::new(stdin);
    write_message(&mut writer, command)?;
    drop(writer);

    read_message(&mut BufReader::new(stdout))
}

/// Collect the runner's exit status whenever it finishes so it does not
/// linger as a zombie while this process lives on.
fn reap_in_background(mut child: Child) {
    let spawned = std::thread::Builder::new()
        .name("nbkit-runner-reaper".to_string())
        .spawn(move || {
            let _ = child.wait();
        });
    if let Err(e) = spawned {
        tracing::debug!("Could not start reaper thread: {}", e);
    }
}

/// Find the nbkit-runner binary path.
///
/// Looks in the following order:
/// 1. `NBKIT_RUNNER_PATH` environment variable
/// 2. Same directory as the current executable
/// 3. System PATH
/// 4. `target/debug` or `target/release` of this workspace
pub fn find_runner_binary() -> Result<PathBuf> {
    let runner_name = if cfg!(windows) {
        "nbkit-runner.exe"
    } else {
        RUNNER_BINARY
    };

    if let Ok(path) = std::env::var("NBKIT_RUNNER_PATH")
        && Path::new(&path).exists()
    {
        return Ok(PathBuf::from(path));
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let runner_path = exe_dir.join(runner_name);
        if runner_path.exists() {
            return Ok(runner_path);
        }
        // Test binaries live one level down, in target/<profile>/deps.
        if let Some(profile_dir) = exe_dir.parent() {
            let runner_path = profile_dir.join(runner_name);
            if runner_path.exists() {
                return Ok(runner_path);
            }
        }
    }

    if let Ok(path) = which::which(runner_name) {
        return Ok(path);
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        for profile in &["debug", "release"] {
            let path = PathBuf::from(&manifest_dir)
                .join("..")
                .join("..")
                .join("target")
                .join(profile)
                .join(runner_name);
            if path.exists() {
                return Ok(path.canonicalize().unwrap_or(path));
            }
        }
    }

    Err(Error::RunnerNotFound(format!(
        "could not find {} (set NBKIT_RUNNER_PATH or ensure it's in PATH)",
        runner_name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftover_scripts(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(".nbkit-"))
            })
            .collect()
    }

    #[test]
    fn test_missing_interpreter() {
        let temp = TempDir::new().unwrap();
        let launcher = Launcher::new(
            LaunchConfig::default().with_interpreter("nbkit-no-such-interpreter-xyz"),
        );

        let err = launcher.launch("x = 1\n", temp.path()).unwrap_err();
        assert!(matches!(err, Error::InterpreterNotFound(_)));
        assert!(leftover_scripts(temp.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_spawn_failure_removes_script() {
        let temp = TempDir::new().unwrap();
        let launcher = Launcher::new(
            LaunchConfig::default()
                .with_interpreter("sh")
                .with_runner(temp.path().join("missing-runner")),
        );

        let err = launcher.launch("true\n", temp.path()).unwrap_err();
        assert!(matches!(err, Error::Launch(msg) if msg.contains("Failed to spawn runner")));
        assert!(leftover_scripts(temp.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_that_exits_early_removes_script() {
        // `true` reads nothing and writes nothing, so no response ever arrives.
        let temp = TempDir::new().unwrap();
        let launcher = Launcher::new(
            LaunchConfig::default()
                .with_interpreter("sh")
                .with_runner(which::which("true").unwrap()),
        );

        let err = launcher.launch("true\n", temp.path()).unwrap_err();
        assert!(matches!(err, Error::Ipc(_)));
        assert!(leftover_scripts(temp.path()).is_empty());
    }

    /// Write an executable shell script.
    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        std::fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_failure_reply_removes_script() {
        // A runner that drains the command, then answers with a failure frame.
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        std::fs::create_dir(&work).unwrap();

        let reply = r#"{"type":"failed","message":"interpreter refused"}"#;
        let runner = temp.path().join("failing-runner");
        write_script(
            &runner,
            &format!(
                "cat > /dev/null\nprintf '\\{:03o}\\000\\000\\000{}'\n",
                reply.len(),
                reply
            ),
        );

        let launcher = Launcher::new(
            LaunchConfig::default()
                .with_interpreter("sh")
                .with_runner(&runner),
        );

        let err = launcher.launch("true\n", &work).unwrap_err();
        assert!(matches!(err, Error::Launch(msg) if msg == "interpreter refused"));
        assert!(leftover_scripts(&work).is_empty());
    }

    #[test]
    fn test_config_builders() {
        let config = LaunchConfig::default()
            .with_interpreter("python3")
            .with_interpreter_args(vec!["-u".to_string()])
            .with_log_path("/tmp/run.log");

        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.interpreter_args, vec!["-u"]);
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/run.log")));
        assert_eq!(config.script_suffix, ".py");
    }
}
