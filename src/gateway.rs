//! The boundary between the editor and the backend.
//!
//! [`PostGateway`] is the request/response contract the editor depends on.
//! Two implementations are provided: [`MemoryGateway`], which keeps
//! everything in process, and [`FileGateway`], which persists posts as JSON
//! files in a directory.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CreatePostPayload, ImageFolder, PostId, PostMetadataDocument, PostObjectView, PublicConfig,
    UpdatePostPayload,
};

mod error;
pub use error::GatewayError;

mod file;
pub use file::{CONFIG_FILE, FileGateway};

mod memory;
pub use memory::MemoryGateway;

mod store;

/// Asynchronous access to the post backend.
///
/// Every call is independent: there is no retry, deduplication or
/// cancellation at this layer. Failures are returned to the caller as-is.
#[async_trait]
pub trait PostGateway: Send + Sync {
    /// Fetch the full record of a post.
    async fn fetch_post(&self, id: &PostId) -> Result<PostObjectView, GatewayError>;

    /// Fetch the listing record of a post in the given scope.
    ///
    /// Deleted posts, and posts outside the scope, are reported as not found.
    async fn fetch_metadata(
        &self,
        id: &PostId,
        private: bool,
    ) -> Result<PostMetadataDocument, GatewayError>;

    /// List listing records.
    async fn list_metadata(
        &self,
        options: &ListOptions,
    ) -> Result<Vec<PostMetadataDocument>, GatewayError>;

    /// Create a post, returning its id.
    async fn create_post(&self, payload: CreatePostPayload) -> Result<PostId, GatewayError>;

    /// Replace the editable fields of a post.
    async fn update_post(&self, id: &PostId, payload: UpdatePostPayload)
    -> Result<(), GatewayError>;

    /// Make a post public or private.
    async fn set_visibility(&self, id: &PostId, public: bool) -> Result<(), GatewayError>;

    /// Set or clear the soft-delete flag of a post.
    async fn set_deleted(&self, id: &PostId, deleted: bool) -> Result<(), GatewayError>;

    /// Count posts in a scope.
    async fn count_posts(&self, public: bool, include_deleted: bool) -> Result<u64, GatewayError>;

    /// Upload an encoded image into a folder on the image host.
    async fn upload_image(
        &self,
        folder: ImageFolder,
        data: Vec<u8>,
    ) -> Result<UploadedImage, GatewayError>;

    /// Delete an image from the image host.
    async fn delete_image(&self, public_id: &str) -> Result<(), GatewayError>;

    /// Public configuration variables.
    async fn app_config(&self) -> Result<PublicConfig, GatewayError>;
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public id (path) of the image.
    pub public_id: String,
    /// Asset id of the image.
    pub asset_id: String,
    /// Detected format, e.g. `png`.
    pub format: String,
}

/// Options for [`PostGateway::list_metadata`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// List private posts instead of public ones.
    pub private: bool,
    /// Only list posts under this topic. `None` lists every topic.
    pub topic: Option<String>,
    /// Sort order.
    pub sort_by: SortBy,
    /// Maximum number of records. `0` means no limit.
    pub limit: u64,
    /// Number of records to skip.
    pub skip: u64,
}

/// Sort order of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Title, ascending.
    Title,
    /// Topic id, ascending.
    Topic,
    /// Creation time, newest first.
    #[default]
    Newest,
    /// Creation time, oldest first.
    Oldest,
    /// Modification time, most recent first.
    Updated,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Topic => "topic",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Updated => "updated",
        })
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "topic" => Ok(Self::Topic),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "updated" => Ok(Self::Updated),
            other => Err(format!(
                "unknown sort order '{other}' (expected title, topic, newest, oldest or updated)"
            )),
        }
    }
}
