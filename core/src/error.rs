use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed identifier '{raw}' in relation '{relation}'")]
    MalformedIdentifier { relation: &'static str, raw: String },

    #[error("Relation '{relation}' has no column '{column}'")]
    MissingColumn { relation: String, column: String },

    #[error(
        "Column '{column}' in relation '{relation}' has {actual} cells, expected {expected}"
    )]
    ColumnLengthMismatch {
        relation: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
