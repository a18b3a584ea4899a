use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("Invalid StructureDefinition {url}: {message}")]
    InvalidStructureDefinition { url: String, message: String },

    #[error(transparent)]
    Model(#[from] terser_models::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
