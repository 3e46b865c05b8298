//! Cell command registry.
//!
//! Front-ends build one `CommandRegistry` at startup, register the commands
//! they offer and hand it the raw text of a cell to dispatch.

use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::directive::CommandLine;
use crate::error::{Error, Result};
use crate::launch::LaunchReport;

/// A cell split into its command line and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInvocation {
    /// Command name, without the `%%`.
    pub name: String,
    /// Arguments after the name on the first line.
    pub args: String,
    /// Remaining lines of the cell.
    pub body: String,
}

impl CellInvocation {
    /// Split cell text into command line and body.
    pub fn parse(cell_text: &str) -> Result<Self> {
        let (first, body) = match cell_text.split_once('\n') {
            Some((first, body)) => (first, body),
            None => (cell_text, ""),
        };
        let command = CommandLine::parse(first)
            .ok_or_else(|| Error::NotACellCommand(first.trim().to_string()))?;

        Ok(Self {
            name: command.name.to_string(),
            args: command.args.to_string(),
            body: body.to_string(),
        })
    }
}

/// What a cell command did.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// A background process was started.
    Launched(LaunchReport),
    /// The extracted program was empty; nothing was started.
    NothingToRun,
    /// Text for the user.
    Text(String),
}

/// A command invoked by a `%%name` cell.
pub trait CellCommand: Send + Sync {
    /// Name matched against the cell's first line.
    fn name(&self) -> &str;

    /// One-line description.
    fn summary(&self) -> &str;

    /// Run the command for a cell.
    fn invoke<'a>(&'a self, invocation: &'a CellInvocation) -> BoxFuture<'a, Result<CommandOutcome>>;
}

/// Registered cell commands, keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn CellCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any command of the same name.
    pub fn register(&mut self, command: impl CellCommand + 'static) -> &mut Self {
        let name = command.name().to_string();
        if self.commands.insert(name.clone(), Box::new(command)).is_some() {
            tracing::warn!("Replaced cell command %%{}", name);
        }
        self
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&dyn CellCommand> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = &dyn CellCommand> {
        self.commands.values().map(|command| command.as_ref())
    }

    /// Parse a cell and run the command its first line names.
    pub async fn dispatch(&self, cell_text: &str) -> Result<CommandOutcome> {
        let invocation = CellInvocation::parse(cell_text)?;
        let command = self.get(&invocation.name).ok_or_else(|| Error::UnknownCommand {
            name: invocation.name.clone(),
            available: self.names().join(", "),
        })?;

        tracing::debug!("Dispatching %%{}", invocation.name);
        command.invoke(&invocation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::FutureExt;

    struct Echo;

    impl CellCommand for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn summary(&self) -> &str {
            "Print the cell body"
        }

        fn invoke<'a>(
            &'a self,
            invocation: &'a CellInvocation,
        ) -> BoxFuture<'a, Result<CommandOutcome>> {
            async move { Ok(CommandOutcome::Text(format!("{}|{}", invocation.args, invocation.body))) }
                .boxed()
        }
    }

    #[test]
    fn test_parse_invocation() {
        let invocation = CellInvocation::parse("%%background fast\nx = 1\ny = 2").unwrap();
        assert_eq!(invocation.name, "background");
        assert_eq!(invocation.args, "fast");
        assert_eq!(invocation.body, "x = 1\ny = 2");
    }

    #[test]
    fn test_parse_invocation_without_body() {
        let invocation = CellInvocation::parse("%%background").unwrap();
        assert_eq!(invocation.body, "");
    }

    #[test]
    fn test_parse_plain_code_is_rejected() {
        let err = CellInvocation::parse("x = 1\n%%background").unwrap_err();
        assert!(matches!(err, Error::NotACellCommand(line) if line == "x = 1"));
    }

    #[tokio::test]
    async fn test_dispatch() {
        let mut registry = CommandRegistry::new();
        registry.register(Echo);

        match registry.dispatch("%%echo loud\nhello").await.unwrap() {
            CommandOutcome::Text(text) => assert_eq!(text, "loud|hello"),
            other => panic!("Unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_command() {
        let mut registry = CommandRegistry::new();
        registry.register(Echo);

        let err = registry.dispatch("%%bash\nls").await.unwrap_err();
        match err {
            Error::UnknownCommand { name, available } => {
                assert_eq!(name, "bash");
                assert_eq!(available, "echo");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CommandRegistry::new();
        registry.register(Echo).register(Echo);

        assert_eq!(registry.names(), vec!["echo"]);
        assert_eq!(registry.get("echo").map(|c| c.summary()), Some("Print the cell body"));
        assert!(registry.get("missing").is_none());
    }
}
