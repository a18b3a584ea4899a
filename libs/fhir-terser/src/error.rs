use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("Invalid literal '{literal}' for type '{type_name}': {reason}")]
    InvalidLiteral {
        type_name: String,
        literal: String,
        reason: String,
    },

    #[error("Field '{field}' already holds its single value")]
    CardinalityViolation { field: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type mismatch at '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("Cannot combine a {source_type} with a {target_type}")]
    ResourceTypeMismatch {
        source_type: String,
        target_type: String,
    },

    #[error("Invalid path: '{0}'")]
    InvalidPath(String),

    #[error(transparent)]
    Context(terser_context::Error),

    #[error(transparent)]
    Model(terser_models::Error),
}

impl From<terser_context::Error> for Error {
    fn from(err: terser_context::Error) -> Self {
        match err {
            terser_context::Error::UnknownType(name) => Error::UnknownType(name),
            terser_context::Error::UnknownField { type_name, field } => {
                Error::UnknownField { type_name, field }
            }
            terser_context::Error::Model(inner) => Error::from(inner),
            other => Error::Context(other),
        }
    }
}

impl From<terser_models::Error> for Error {
    fn from(err: terser_models::Error) -> Self {
        match err {
            terser_models::Error::InvalidLiteral {
                type_name,
                literal,
                reason,
            } => Error::InvalidLiteral {
                type_name,
                literal,
                reason,
            },
            other => Error::Model(other),
        }
    }
}
