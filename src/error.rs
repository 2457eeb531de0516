use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinearAdvanceError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown parent setting: {0}")]
    UnknownParent(String),

    #[error("Setting already present: {0}")]
    DuplicateSetting(String),

    #[error("Container '{0}' has no material category")]
    MissingMaterialCategory(String),
}

impl From<LinearAdvanceError> for String {
    fn from(err: LinearAdvanceError) -> Self {
        err.to_string()
    }
}
