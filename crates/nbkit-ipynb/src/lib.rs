//! Jupyter notebook model for nbkit.
//!
//! Only the parts of the nbformat 4 schema that nbkit reads are modelled
//! explicitly (cell type, source and metadata). Every other field is kept as
//! opaque JSON in an `extra` map, so a notebook can be written back without
//! losing outputs, execution counts or cell ids.

mod error;
mod ipynb;

pub use error::{IpynbError, IpynbResult};
pub use ipynb::{Cell, CellType, Notebook, Source};
