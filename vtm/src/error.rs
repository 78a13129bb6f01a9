//! Provider error type
//!
//! Callers branch on [`Error::kind`], never on message text.

use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named object does not exist on the traffic manager
    NotFound,
    /// Any other failure talking to the traffic manager
    RemoteCall,
    /// A `regex_match` pattern did not compile
    InvalidPattern,
    /// Configuration or state that cannot be mapped onto the REST API
    InvalidConfig,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{attribute}: {message}")]
    InvalidConfig { attribute: String, message: String },

    #[error(transparent)]
    State(#[from] tfplug::TfplugError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api(e) => e.kind(),
            Error::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Error::State(tfplug::TfplugError::Cancelled) => ErrorKind::RemoteCall,
            Error::InvalidConfig { .. } | Error::State(_) => ErrorKind::InvalidConfig,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn invalid_config(attribute: &str, message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            attribute: attribute.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
