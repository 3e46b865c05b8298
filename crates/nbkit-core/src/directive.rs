//! Cell and line directive parsing.
//!
//! A cell directive is a `%%name args` line at the very top of a cell. A line
//! directive is any line starting with `%`. Only the first line of a cell is
//! ever considered as a cell directive.
//!
//! A cell can also invoke a command through a shell escape such as
//! `!nbkit background`; that line marks the cell as the invoking one.

/// Prefix of a cell directive line.
pub const CELL_COMMAND_PREFIX: &str = "%%";

/// Prefix of a line directive.
pub const LINE_COMMAND_PREFIX: char = '%';

/// Prefix of a shell escape line.
pub const SHELL_ESCAPE_PREFIX: char = '!';

/// Program name matched in shell escape lines.
pub const PROGRAM_NAME: &str = "nbkit";

/// A parsed `%%name args` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Command name (may be empty for a bare `%%`).
    pub name: &'a str,
    /// Everything after the name, trimmed.
    pub args: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Parse a cell directive line. Returns `None` if the line is not one.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix(CELL_COMMAND_PREFIX)?;
        let rest = rest.trim_end_matches(['\n', '\r']);
        let (name, args) = match rest.find(char::is_whitespace) {
            Some(split) => (&rest[..split], rest[split..].trim()),
            None => (rest, ""),
        };
        Some(Self { name, args })
    }
}

/// Classification of a cell's first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDirective<'a> {
    /// Plain code.
    None,
    /// The command doing the scanning; its cell is included minus this line.
    Own(CommandLine<'a>),
    /// Any other cell command; the whole cell is skipped.
    Other(CommandLine<'a>),
}

impl<'a> CellDirective<'a> {
    /// Classify the first line of a cell against the scanning command's name.
    pub fn classify(first_line: &'a str, own_command: &str) -> Self {
        match CommandLine::parse(first_line) {
            Some(command) if command.name == own_command => Self::Own(command),
            Some(command) => Self::Other(command),
            None => Self::None,
        }
    }
}

/// Whether a source line is a line directive such as `%time` or `%matplotlib`.
pub fn is_line_command(line: &str) -> bool {
    line.starts_with(LINE_COMMAND_PREFIX)
}

/// Whether a source line runs `command` through a shell escape, as in
/// `!nbkit background` or `!~/.cargo/bin/nbkit background --log run.log`.
pub fn is_shell_invocation(line: &str, command: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix(SHELL_ESCAPE_PREFIX) else {
        return false;
    };
    let mut words = rest.split_whitespace();
    let program = words.next().unwrap_or("");
    let program = program.rsplit('/').next().unwrap_or(program);

    program == PROGRAM_NAME && words.next() == Some(command)
}
