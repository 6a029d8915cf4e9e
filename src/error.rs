//! Error taxonomy for marker import/export.
//!
//! Every parse-time error aborts the whole file: callers never observe a
//! partially populated [`MarkerFile`](crate::models::MarkerFile).

use std::path::PathBuf;

use thiserror::Error;

/// Marker import/export errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The document is not well-formed XML, its root is not one of the two
    /// known marker lists, or an attribute value cannot be parsed.
    #[error("Unrecognized marker file: {0}")]
    Format(String),

    #[error("Missing required attribute `{attribute}` on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid value `{value}` for attribute `{attribute}`")]
    InvalidEnum { attribute: String, value: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn missing(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
