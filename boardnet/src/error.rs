use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardNetError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown layout: {0} (expected force-directed, circular, hierarchical or cluster)")]
    UnknownLayout(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoardNetError {
    /// Process exit code used by the CLI for this error.
    ///
    /// Input problems (bad member records, unknown layout names, malformed
    /// JSON) map to the conventional usage/data error codes; IO failures map
    /// to the IO error code.
    pub fn exit_code(&self) -> u8 {
        match self {
            BoardNetError::Validation(_) => 65,
            BoardNetError::UnknownLayout(_) => 64,
            BoardNetError::Json(_) => 65,
            BoardNetError::Io(_) => 74,
        }
    }
}

pub type Result<T> = std::result::Result<T, BoardNetError>;
