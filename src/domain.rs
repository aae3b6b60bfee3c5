//! Domain models for the post editor.
//!
//! This module contains the editable post record, the shapes exchanged with
//! the backend, the topic catalog and configuration.

mod config;
pub use config::{Config, ConfigError, Environment, PublicConfig};

/// Remote document shapes returned by the backend.
pub mod document;
pub use document::{
    PostCoverImage, PostMetadataDocument, PostObjectView, RelatedPostRecord, RemoteDocument,
    RemoteId,
};

mod id;
pub use id::{InvalidPostId, PostId};

/// Hosted image URLs and upload folders.
pub mod image;
pub use image::{ImageFolder, ImageUrls};

/// Save payloads sent to the backend.
pub mod payload;
pub use payload::{CoverImageFields, CreatePostPayload, UpdatePostPayload};

mod post;
pub use post::{CoverImageRef, DEFAULT_FORMAT, DEFAULT_LICENSE, EditablePost, RelatedPost};

mod slug;
pub use slug::compute_slug;

pub mod topic;
pub use topic::{FALLBACK_TOPIC_NAME, Topic, TopicCatalog, TopicCatalogError};
