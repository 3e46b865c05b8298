//! Servers command: list running notebook servers and their sessions.

use nbkit::session::{RuntimeDirs, SessionsClient, list_running_servers};

use crate::colors;

/// Execute the servers command.
pub async fn execute() -> anyhow::Result<()> {
    let runtime = RuntimeDirs::from_env();
    let servers = list_running_servers(&runtime.runtime_dir);

    println!(
        "\n{}Notebook servers{} {}({}){}",
        colors::BOLD,
        colors::RESET,
        colors::DIM,
        runtime.runtime_dir.display(),
        colors::RESET
    );
    println!("{}", "─".repeat(50));

    if servers.is_empty() {
        println!("{}No running servers found{}", colors::YELLOW, colors::RESET);
        return Ok(());
    }

    let client = SessionsClient::new();
    for server in &servers {
        let root = server
            .root()
            .map(|root| root.display().to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{}{}{}  {}", colors::CYAN, server.url, colors::RESET, root);

        match client.list_sessions(server).await {
            Ok(sessions) => {
                for session in &sessions {
                    println!(
                        "  {}{}{}  {}",
                        colors::DIM,
                        session.kernel_id().unwrap_or("-"),
                        colors::RESET,
                        session.notebook_path().unwrap_or("-")
                    );
                }
            }
            Err(e) => println!("  {}unreachable:{} {}", colors::RED, colors::RESET, e),
        }
    }

    Ok(())
}
