//! nbkit-runner - starts a background program and cleans up after it.
//!
//! Spawned by the launcher with piped stdin/stdout. Reads one `Launch`
//! command, detaches into its own session, starts the interpreter and
//! answers `Started` or `Failed`. It then waits for the interpreter and
//! deletes the script, so the script lives exactly as long as it is needed.
//!
//! Neither the runner nor the program shares a descriptor with whoever called
//! the launcher: program output goes to the log file or nowhere.

use std::fs::{self, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::process::{Child, Command, ExitCode, Stdio};

use nbkit::core::launch::protocol::{RunnerCommand, RunnerResponse, read_message, write_message};

fn main() -> ExitCode {
    // Logs go to stderr; stdout is the response channel.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let command: RunnerCommand = match read_message(&mut BufReader::new(io::stdin())) {
        Ok(command) => command,
        Err(e) => {
            tracing::error!("Failed to read launch command: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let RunnerCommand::Launch {
        interpreter,
        args,
        script,
        working_dir,
        log_path,
    } = command;

    detach();

    let mut response_channel = BufWriter::new(io::stdout());
    let spawned = spawn_interpreter(&interpreter, &args, &script, &working_dir, log_path.as_deref());

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            let message = format!("Failed to start {}: {}", interpreter.display(), e);
            tracing::error!("{}", message);
            if let Err(e) = write_message(&mut response_channel, &RunnerResponse::Failed { message }) {
                tracing::error!("Failed to report launch failure: {}", e);
            }
            return ExitCode::FAILURE;
        }
    };

    let response = RunnerResponse::Started { pid: child.id() };
    if let Err(e) = write_message(&mut response_channel, &response) {
        // The launcher is gone and will delete the script itself; the
        // interpreter keeps whatever it already has open.
        tracing::warn!("Failed to report start: {}", e);
    }
    drop(response_channel);

    match child.wait() {
        Ok(status) => tracing::debug!("{} exited with {}", script.display(), status),
        Err(e) => tracing::warn!("Failed to wait for {}: {}", script.display(), e),
    }

    if let Err(e) = fs::remove_file(&script)
        && e.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove {}: {}", script.display(), e);
    }

    ExitCode::SUCCESS
}

/// Leave the caller's session so the program survives the kernel and its
/// terminal going away.
#[cfg(unix)]
fn detach() {
    // SAFETY: setsid has no memory safety preconditions. It fails only when
    // this process already leads a process group, which is harmless here.
    let result = unsafe { libc::setsid() };
    if result == -1 {
        tracing::debug!("setsid failed: {}", io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn detach() {}

fn spawn_interpreter(
    interpreter: &Path,
    args: &[String],
    script: &Path,
    working_dir: &Path,
    log_path: Option<&Path>,
) -> io::Result<Child> {
    let (stdout, stderr) = match log_path {
        Some(path) => {
            let log = OpenOptions::new().create(true).append(true).open(path)?;
            let log_err = log.try_clone()?;
            (Stdio::from(log), Stdio::from(log_err))
        }
        None => (Stdio::null(), Stdio::null()),
    };

    Command::new(interpreter)
        .args(args)
        .arg(script)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
}
