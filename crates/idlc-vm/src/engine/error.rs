//! Runtime errors, following the taxonomy of the generated Go code.

use idlc_core::TypeRef;

/// Errors raised while encoding, decoding or dispatching.
///
/// Context added on the way up (`error reading field 3: ...`) is kept as a
/// chain of [`RuntimeError::Context`] wrappers; [`RuntimeError::cause`]
/// strips it, like `thrift.Cause` does for generated code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("unexpected end of input: need {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid wire type tag {0}")]
    InvalidWireType(u8),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("negative size {0}")]
    NegativeSize(i32),

    #[error("bad protocol version {0:#010x}")]
    BadVersion(u32),

    #[error("depth limit {0} exceeded")]
    DepthLimit(usize),

    #[error("Required field {field} is not set")]
    RequiredFieldNotSet { field: String },

    #[error("*{struct_name} write union: exactly one field must be set ({count} set).")]
    UnionArity { struct_name: String, count: usize },

    #[error("internal error: expected {expected} value, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("unknown struct {0}")]
    UnknownStruct(TypeRef),

    #[error("{struct_name} has no field {field}")]
    UnknownField { struct_name: String, field: String },

    #[error("unknown service {0}")]
    UnknownService(TypeRef),

    #[error("{service} has no function {function}")]
    UnknownFunction { service: String, function: String },

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error("{context}{source}")]
    Context {
        context: String,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// Wrap with a message prefix (`thrift.PrependError`).
    pub fn prepend(self, context: impl Into<String>) -> Self {
        RuntimeError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, without any prepended context.
    pub fn cause(&self) -> &RuntimeError {
        let mut current = self;
        while let RuntimeError::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

/// `TApplicationException` type ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationErrorKind {
    Unknown,
    UnknownMethod,
    InvalidMessageType,
    WrongMethodName,
    BadSequenceId,
    MissingResult,
    InternalError,
    ProtocolError,
}

impl ApplicationErrorKind {
    pub fn from_i32(id: i32) -> Self {
        match id {
            1 => Self::UnknownMethod,
            2 => Self::InvalidMessageType,
            3 => Self::WrongMethodName,
            4 => Self::BadSequenceId,
            5 => Self::MissingResult,
            6 => Self::InternalError,
            7 => Self::ProtocolError,
            _ => Self::Unknown,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::UnknownMethod => 1,
            Self::InvalidMessageType => 2,
            Self::WrongMethodName => 3,
            Self::BadSequenceId => 4,
            Self::MissingResult => 5,
            Self::InternalError => 6,
            Self::ProtocolError => 7,
        }
    }
}

/// Transport-level failure reported by the server or the client runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApplicationError {
    pub kind: ApplicationErrorKind,
    pub message: String,
}

impl ApplicationError {
    pub fn new(kind: ApplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
