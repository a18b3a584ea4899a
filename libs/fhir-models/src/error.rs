use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {type_name} literal '{literal}': {reason}")]
    InvalidLiteral {
        type_name: String,
        literal: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_literal(
        type_name: &str,
        literal: &str,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidLiteral {
            type_name: type_name.to_string(),
            literal: literal.to_string(),
            reason: reason.into(),
        }
    }
}
