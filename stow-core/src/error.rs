use thiserror::Error;

/// Coarse classification of a [`StowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required structural element (mapping, property, key) is absent.
    Mapping,
    /// The supplied filter, qualifier or order shape cannot be rendered.
    Statement,
    /// The dialect or entity does not support the requested operation.
    Capability,
    /// A second registration for an already mapped key.
    Conflict,
    /// The execution was cancelled by a trace hook or a cancellation token.
    Cancelled,
    InvalidOperation,
    NullReference,
    Conversion,
}

/// Errors raised by the library itself.
///
/// They travel inside [`crate::Error`] (an `anyhow::Error`), use
/// `error.downcast_ref::<StowError>()` to inspect them. Driver failures are
/// never wrapped into this type.
#[derive(Debug, Error)]
pub enum StowError {
    #[error("No mapping found for `{0}`")]
    MissingMapping(String),
    #[error("Property `{property}` was not found on `{entity}`")]
    PropertyNotFound { entity: String, property: String },
    #[error("No primary field found for `{0}`")]
    PrimaryFieldNotFound(String),
    #[error("No identity field found for `{0}`")]
    IdentityFieldNotFound(String),
    #[error("No key field found for `{0}`, provide either a primary field or an explicit filter")]
    KeyFieldNotFound(String),
    #[error("Unsupported query expression: {0}")]
    InvalidQueryExpression(String),
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
    #[error("Invalid qualifier fields: {0}")]
    InvalidQualifierFields(String),
    #[error("Missing qualifier fields for `{0}`")]
    MissingQualifierFields(String),
    #[error("Invalid order fields: {0}")]
    InvalidOrderFields(String),
    #[error("Entity `{0}` cannot be queried")]
    EntityNotQueryable(String),
    #[error("Entity `{0}` cannot be inserted")]
    EntityNotInsertable(String),
    #[error("Entity `{0}` cannot be updated")]
    EntityNotUpdatable(String),
    #[error("Entity `{0}` cannot be merged")]
    EntityNotMergeable(String),
    #[error("Entity `{0}` cannot be deleted")]
    EntityNotDeletable(String),
    #[error("Entity `{0}` cannot be counted")]
    EntityNotCountable(String),
    #[error("A database type is already mapped for `{0}`")]
    DuplicateTypeMap(String),
    #[error("A mapping already exists for `{0}`")]
    MappingExists(String),
    #[error("The execution of `{0}` was cancelled by the trace")]
    CancelledExecution(String),
    #[error("The operation was cancelled")]
    OperationCancelled,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("The `{0}` argument is null")]
    NullReference(String),
    #[error("The `{0}` argument is empty")]
    EmptyArgument(String),
    #[error("Cannot convert {0}")]
    Conversion(String),
}

impl StowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingMapping(..)
            | Self::PropertyNotFound { .. }
            | Self::PrimaryFieldNotFound(..)
            | Self::IdentityFieldNotFound(..)
            | Self::KeyFieldNotFound(..) => ErrorKind::Mapping,
            Self::InvalidQueryExpression(..)
            | Self::InvalidExpression(..)
            | Self::InvalidQualifierFields(..)
            | Self::MissingQualifierFields(..)
            | Self::InvalidOrderFields(..) => ErrorKind::Statement,
            Self::EntityNotQueryable(..)
            | Self::EntityNotInsertable(..)
            | Self::EntityNotUpdatable(..)
            | Self::EntityNotMergeable(..)
            | Self::EntityNotDeletable(..)
            | Self::EntityNotCountable(..) => ErrorKind::Capability,
            Self::DuplicateTypeMap(..) | Self::MappingExists(..) => ErrorKind::Conflict,
            Self::CancelledExecution(..) | Self::OperationCancelled => ErrorKind::Cancelled,
            Self::InvalidOperation(..) => ErrorKind::InvalidOperation,
            Self::NullReference(..) | Self::EmptyArgument(..) => ErrorKind::NullReference,
            Self::Conversion(..) => ErrorKind::Conversion,
        }
    }
}

/// Returns the kind of the error if it was raised by this library.
pub fn error_kind(error: &crate::Error) -> Option<ErrorKind> {
    error.downcast_ref::<StowError>().map(StowError::kind)
}
