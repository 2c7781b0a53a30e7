use crate::value::{Value, join};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while defining model types or writing to instances.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write to an enum field with a value outside its declared set.
    /// Only that one field's assignment is aborted.
    #[error("{value} is not one of the enums: {}", join(.allowed, ", "))]
    EnumConstraintViolation {
        field: String,
        value: Value,
        allowed: Vec<Value>,
    },

    #[error("id field '{field}' is not declared on model type {type_name}")]
    UnknownIdField { type_name: String, field: String },

    #[error("model type {type_name} has no method '{name}'")]
    UnknownMethod { type_name: String, name: String },

    #[error("model type {type_name} has no helper '{name}'")]
    UnknownHelper { type_name: String, name: String },

    #[error("unknown field type: {name}")]
    UnknownType { name: String },

    #[error("invalid model declaration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
