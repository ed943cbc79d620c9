use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid dimension for {field}: '{value}'")]
    InvalidDimension { field: String, value: String },

    #[error("missing required input file: {}", path.display())]
    MissingConfig { path: PathBuf },

    #[error("packingsolver binary not found at {}", path.display())]
    SolverNotFound { path: PathBuf },

    #[error("packingsolver exited with {status}:\n{stderr}")]
    SolverFailure { status: String, stderr: String },

    #[error("unreadable solver output: {0}")]
    SolverOutput(String),

    #[error("node {node} has an ambiguous parent reference '{raw}'")]
    AmbiguousParentReference { node: usize, raw: String },

    #[error("node {node} references missing parent node {parent}")]
    DanglingParent { node: usize, parent: usize },

    #[error("node {node} references missing stock sheet {plate}")]
    UnknownPlate { node: usize, plate: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LayoutError {
    pub fn invalid_dimension(field: impl Into<String>, value: impl Into<String>) -> Self {
        LayoutError::InvalidDimension {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the solver or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LayoutError::InvalidDimension { .. } | LayoutError::MissingConfig { .. }
        )
    }
}
