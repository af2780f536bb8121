use thiserror::Error;

/// The error type shared by all tessera crates.
///
/// Wraps a boxed [`ErrorKind`] to keep `Result<T>` slim on the happy path.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn out_of_range(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::OutOfRange {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Constructs an error for an index that falls outside an addressable
    /// span of `len` elements.
    pub fn index_out_of_range(name: impl Into<String>, index: usize, len: usize) -> Error {
        Error(
            ErrorKind::OutOfRange {
                name: name.into(),
                message: format!("index {index} is outside the addressable span of {len}"),
            }
            .into(),
        )
    }

    pub fn internal(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Internal {
                message: message.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("{name} out of range: {message}")]
    OutOfRange { name: String, message: String },

    #[error("internal invariant violated: {message}")]
    Internal { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::internal("infallible conversion")
    }
}
