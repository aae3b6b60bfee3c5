use std::{io, path::PathBuf};

use crate::domain::{ConfigError, InvalidPostId, PostId};

/// Error returned by a [`PostGateway`](crate::PostGateway) call.
///
/// Errors are passed through to the caller unchanged; gateways never retry.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No post exists with the given id.
    #[error("post '{0}' not found")]
    NotFound(PostId),

    /// An id supplied to or returned by the backend is malformed.
    #[error(transparent)]
    InvalidId(#[from] InvalidPostId),

    /// The upload is not an image format the image host accepts.
    #[error("unsupported image format")]
    UnsupportedImage,

    /// A public id does not name an image inside an upload folder.
    #[error("invalid image id '{0}'")]
    InvalidImageId(String),

    /// No image exists with the given public id.
    #[error("image '{0}' not found")]
    ImageNotFound(String),

    /// A stored post could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A stored post is not valid JSON.
    #[error("malformed post data at {path}: {source}")]
    Json {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The store configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
