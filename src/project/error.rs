use thiserror::Error;

use crate::block::BlockError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema_version {0}")]
    SchemaVersion(u32),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("block '{block}': {source}")]
    Block {
        block: String,
        #[source]
        source: BlockError,
    },
    #[error("invalid value for '{block}.{field}': {reason}")]
    InvalidValue {
        block: String,
        field: &'static str,
        reason: String,
    },
}
