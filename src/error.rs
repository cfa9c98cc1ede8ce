// SPDX-License-Identifier: MPL-2.0
use std::fmt;

pub use crate::application::port::StorageError;
pub use crate::domain::error::{AnalysisError, ImageError, SessionError};

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Image(ImageError),
    Analysis(AnalysisError),
    Session(SessionError),
    Storage(StorageError),
}

/// Coarse classification driving retry and user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caused by the user's input; retrying cannot help.
    User,

    /// Transient infrastructure failure (network, storage, workers).
    System,

    /// A rule of the app rejected the request.
    Business,
}

impl Error {
    /// Returns the category used by the retry policy and by callers
    /// deciding what to show.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Io(_) => ErrorCategory::System,
            Error::Config(_) | Error::Analysis(_) => ErrorCategory::Business,
            Error::Image(ImageError::InvalidImage(_)) | Error::Session(_) => ErrorCategory::User,
            Error::Image(_) => ErrorCategory::System,
            Error::Storage(err) => err.category(),
        }
    }

    /// Only system errors are worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::System
    }

    /// Short message suitable for a blocking alert.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::User => "Please check your selection and try again.",
            ErrorCategory::System => {
                "A network or storage problem occurred. Please try again later."
            }
            ErrorCategory::Business => "This action could not be completed.",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Image(e) => write!(f, "Image Error: {}", e),
            Error::Analysis(e) => write!(f, "Analysis Error: {}", e),
            Error::Session(e) => write!(f, "Session Error: {}", e),
            Error::Storage(e) => write!(f, "Storage Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        Error::Image(err)
    }
}

impl From<AnalysisError> for Error {
    fn from(err: AnalysisError) -> Self {
        Error::Analysis(err)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Error::Session(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(ImageError::InvalidImage(err.to_string()))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Image(ImageError::ProcessingFailed(err.to_string()))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
