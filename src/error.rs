use crate::Method;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("URL blocked by rewriter: {0}")]
    UrlBlocked(String),
    #[error("Could not retrieve response code")]
    MissingStatusCode,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Authentication failure: {0}")]
    AuthFailure(String),
    #[error("Unrecognized request method {0}")]
    UnsupportedMethod(Method),
    #[error("Unknown method type {0}")]
    UnknownMethod(i32),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// How a caller should treat an [`Error`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Network or connection level failure, including a blocked URL.
    Io,
    /// Credentials could not be produced for the request.
    Auth,
    /// The request itself is malformed. Retrying cannot help.
    Fatal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UrlBlocked(_)
            | Error::MissingStatusCode
            | Error::Transport(_)
            | Error::Io(_) => ErrorKind::Io,
            Error::AuthFailure(_) => ErrorKind::Auth,
            Error::UnsupportedMethod(_) | Error::UnknownMethod(_) | Error::InvalidHeader(_) => {
                ErrorKind::Fatal
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}
