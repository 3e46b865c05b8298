//! Import statement discovery.
//!
//! Finds single-line `import ...` and `from ... import ...` statements in a
//! notebook's code cells and guesses which of them a piece of source needs.
//! This is a text heuristic: multi-line imports are missed, and a string that
//! happens to look like an import is taken for one.

use nbkit_ipynb::Notebook;

/// An import statement and the names it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Names bound by the statement (`np` for `import numpy as np`).
    pub names: Vec<String>,
    /// The statement text, trimmed.
    pub line: String,
}

impl ImportStatement {
    /// Parse a single source line. Returns `None` if it is not an import.
    pub fn parse(line: &str) -> Option<Self> {
        let code = line.split('#').next().unwrap_or("").trim();
        let words: Vec<&str> = code.split_whitespace().collect();

        let names = match words.as_slice() {
            ["import", ..] => bound_names(code.strip_prefix("import")?, true),
            ["from", _, "import", _, ..] => {
                let (_, imported) = code.split_once(" import ")?;
                bound_names(imported, false)
            }
            _ => return None,
        };

        if names.is_empty() {
            return None;
        }

        Some(Self {
            names,
            line: code.to_string(),
        })
    }
}

/// Names bound by the comma separated list after `import`.
///
/// `package` is true for `import a.b`, which binds `a`.
fn bound_names(list: &str, package: bool) -> Vec<String> {
    list.replace(['(', ')'], "")
        .split(',')
        .filter_map(|item| {
            let words: Vec<&str> = item.split_whitespace().collect();
            let name = match words.as_slice() {
                [_, "as", alias] => *alias,
                [name] => *name,
                _ => return None,
            };
            let name = if package {
                name.split('.').next().unwrap_or(name)
            } else {
                name
            };
            (name != "*").then(|| name.to_string())
        })
        .collect()
}

/// Collect the import statements of every code cell, in document order.
///
/// Statements binding the same names are collapsed: the later text wins but
/// keeps the position of the first.
pub fn collect_imports(notebook: &Notebook) -> Vec<ImportStatement> {
    let mut imports: Vec<ImportStatement> = Vec::new();

    for (_, cell) in notebook.code_cells() {
        for line in cell.source.lines() {
            let Some(statement) = ImportStatement::parse(line) else {
                continue;
            };
            match imports.iter_mut().find(|s| s.names == statement.names) {
                Some(existing) => existing.line = statement.line,
                None => imports.push(statement),
            }
        }
    }

    tracing::debug!("Found {} import statements", imports.len());
    imports
}

/// The imports a piece of source appears to use, sorted by statement text.
///
/// A name counts as used when it is called (`name(`), accessed (`name.`), or
/// is longer than three characters and occurs anywhere. Short aliases such as
/// `np` or `pd` show up inside other words too often to match on their own.
pub fn imports_needed<'a>(imports: &'a [ImportStatement], source: &str) -> Vec<&'a ImportStatement> {
    let mut needed: Vec<&ImportStatement> = imports
        .iter()
        .filter(|statement| statement.names.iter().any(|name| uses_name(source, name)))
        .collect();

    needed.sort_by(|a, b| a.line.cmp(&b.line));
    needed.dedup_by(|a, b| a.line == b.line);
    needed
}

fn uses_name(source: &str, name: &str) -> bool {
    let call = format!("{}(", name);
    let access = format!("{}.", name);

    source.lines().any(|line| {
        line.contains(name)
            && (line.contains(&call) || line.contains(&access) || name.len() > 3)
    })
}
