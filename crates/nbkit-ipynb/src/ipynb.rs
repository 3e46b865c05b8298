//! Jupyter notebook (.ipynb) reading and writing.
//!
//! Notebooks are always read fresh from disk; nothing here caches.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{IpynbError, IpynbResult};

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Notebook cells in document order
    pub cells: Vec<Cell>,

    /// Notebook metadata (kernelspec, language_info, ...)
    #[serde(default)]
    pub metadata: Value,

    /// Format version
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    /// Minor format version
    #[serde(default)]
    pub nbformat_minor: u32,

    /// Any other top-level fields, kept for writing back
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_nbformat() -> u32 {
    4
}

/// A notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Cell type
    pub cell_type: CellType,

    /// Cell source lines
    #[serde(default)]
    pub source: Source,

    /// Cell metadata
    #[serde(default)]
    pub metadata: Value,

    /// Fields nbkit does not read (`id`, `outputs`, `execution_count`,
    /// `attachments`), kept for writing back
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The type of a cell.
///
/// Unknown types are preserved rather than rejected so that notebooks written
/// by newer front-ends still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    Other(String),
}

impl From<String> for CellType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            "raw" => Self::Raw,
            _ => Self::Other(value),
        }
    }
}

impl From<CellType> for String {
    fn from(value: CellType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => f.write_str("code"),
            Self::Markdown => f.write_str("markdown"),
            Self::Raw => f.write_str("raw"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Cell source as a list of lines.
///
/// nbformat stores source either as an array of strings, each keeping its
/// trailing newline, or as one multi-line string. Both forms deserialize to
/// the same line list; serialization always produces the array form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Source(Vec<String>);

impl Source {
    /// Build a source from already split lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }

    /// Split a multi-line string the way nbformat does, keeping newlines.
    pub fn from_text(text: &str) -> Self {
        Self(text.split_inclusive('\n').map(str::to_string).collect())
    }

    /// The source lines.
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// The first line, if any.
    pub fn first_line(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The source joined back into a single string.
    pub fn text(&self) -> String {
        self.0.concat()
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSource {
            Lines(Vec<String>),
            Text(String),
        }

        Ok(match RawSource::deserialize(deserializer)? {
            RawSource::Lines(lines) => Self(lines),
            RawSource::Text(text) => Self::from_text(&text),
        })
    }
}

impl Cell {
    /// Create a code cell from source lines.
    pub fn code<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_type(CellType::Code, Source::from_lines(lines))
    }

    /// Create a markdown cell from source lines.
    pub fn markdown<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_type(CellType::Markdown, Source::from_lines(lines))
    }

    /// Create a cell of any type.
    pub fn with_type(cell_type: CellType, source: Source) -> Self {
        Self {
            cell_type,
            source,
            metadata: Value::Object(Default::default()),
            extra: Map::new(),
        }
    }

    /// Whether this is a code cell.
    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }
}

impl Notebook {
    /// Create a new empty notebook.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Value::Object(Default::default()),
            nbformat: 4,
            nbformat_minor: 5,
            extra: Map::new(),
        }
    }

    /// Append a cell.
    pub fn push(&mut self, cell: Cell) -> &mut Self {
        self.cells.push(cell);
        self
    }

    /// Iterate over code cells together with their document index.
    pub fn code_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, cell)| cell.is_code())
    }

    /// Parse a notebook from its JSON text.
    ///
    /// Only nbformat 4 and later are accepted; older notebooks keep their
    /// cells under `worksheets` and are reported as invalid.
    pub fn from_json_str(json: &str) -> IpynbResult<Self> {
        let value: Value = serde_json::from_str(json)?;

        let version = value.get("nbformat").and_then(Value::as_u64).unwrap_or(4);
        if version < 4 {
            return Err(IpynbError::InvalidNotebook(format!(
                "nbformat {} is not supported (need 4 or later)",
                version
            )));
        }

        if !value.get("cells").is_some_and(Value::is_array) {
            return Err(IpynbError::InvalidNotebook(
                "missing top-level `cells` array".to_string(),
            ));
        }

        let notebook: Self = serde_json::from_value(value)?;
        Ok(notebook)
    }

    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> IpynbResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| IpynbError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let notebook = Self::from_json_str(&content)?;

        tracing::debug!(
            "Loaded {} ({} cells)",
            path.display(),
            notebook.cells.len()
        );

        Ok(notebook)
    }

    /// Write the notebook to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> IpynbResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| IpynbError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notebook() {
        let notebook = Notebook::new();
        assert_eq!(notebook.nbformat, 4);
        assert!(notebook.cells.is_empty());
    }

    #[test]
    fn test_source_as_array() {
        let notebook = Notebook::from_json_str(
            r#"{"cells": [{"cell_type": "code", "source": ["a = 1\n", "b = 2"]}],
                "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#,
        )
        .unwrap();

        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Code);
        assert_eq!(notebook.cells[0].source.lines(), ["a = 1\n", "b = 2"]);
    }

    #[test]
    fn test_source_as_string() {
        let notebook = Notebook::from_json_str(
            r#"{"cells": [{"cell_type": "code", "source": "a = 1\nb = 2"}]}"#,
        )
        .unwrap();

        assert_eq!(notebook.cells[0].source.lines(), ["a = 1\n", "b = 2"]);
        assert_eq!(notebook.cells[0].source.text(), "a = 1\nb = 2");
    }

    #[test]
    fn test_empty_source_string() {
        let notebook =
            Notebook::from_json_str(r#"{"cells": [{"cell_type": "code", "source": ""}]}"#)
                .unwrap();
        assert!(notebook.cells[0].source.is_empty());
    }

    #[test]
    fn test_cell_types() {
        let notebook = Notebook::from_json_str(
            r##"{"cells": [
                {"cell_type": "markdown", "source": ["# Title"]},
                {"cell_type": "raw", "source": []},
                {"cell_type": "heading", "source": []},
                {"cell_type": "code", "source": ["x"], "outputs": [], "execution_count": 3}
            ]}"##,
        )
        .unwrap();

        let types: Vec<_> = notebook.cells.iter().map(|c| c.cell_type.clone()).collect();
        assert_eq!(
            types,
            vec![
                CellType::Markdown,
                CellType::Raw,
                CellType::Other("heading".to_string()),
                CellType::Code,
            ]
        );
        assert_eq!(notebook.code_cells().map(|(i, _)| i).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_missing_cells_is_invalid() {
        let err = Notebook::from_json_str(r#"{"metadata": {}}"#).unwrap_err();
        assert!(matches!(err, IpynbError::InvalidNotebook(_)));
    }

    #[test]
    fn test_old_nbformat_is_invalid() {
        let err = Notebook::from_json_str(r#"{"nbformat": 3, "worksheets": []}"#).unwrap_err();
        assert!(err.to_string().contains("nbformat 3"));
    }

    #[test]
    fn test_malformed_json() {
        let err = Notebook::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, IpynbError::JsonError(_)));
    }

    #[test]
    fn test_wrong_source_type() {
        let err =
            Notebook::from_json_str(r#"{"cells": [{"cell_type": "code", "source": 42}]}"#)
                .unwrap_err();
        assert!(matches!(err, IpynbError::JsonError(_)));
    }

    #[test]
    fn test_unmodelled_cell_fields_kept() {
        let notebook = Notebook::from_json_str(
            r#"{"cells": [{"cell_type": "code", "id": "c1", "execution_count": 7,
                "outputs": [{"output_type": "stream", "name": "stdout", "text": ["1\n"]}],
                "source": ["print(1)"], "metadata": {}}]}"#,
        )
        .unwrap();

        let cell = &notebook.cells[0];
        assert_eq!(cell.extra["id"], "c1");
        assert_eq!(cell.extra["execution_count"], 7);
        assert!(!cell.extra.contains_key("source"));

        let json = serde_json::to_value(&notebook).unwrap();
        assert_eq!(json["cells"][0]["outputs"][0]["text"][0], "1\n");
    }

    #[test]
    fn test_serialization_uses_line_arrays() {
        let mut notebook = Notebook::new();
        notebook.push(Cell::code(["a = 1\n", "b = 2"]));
        let json = serde_json::to_string(&notebook).unwrap();

        assert!(json.contains(r#""cell_type":"code""#));
        assert!(json.contains(r#""source":["a = 1\n","b = 2"]"#));
    }
}
