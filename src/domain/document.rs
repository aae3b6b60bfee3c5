// Remote document shapes returned by the backend.
//
// These mirror the JSON the backend produces. Field names follow the wire
// format (`_id`, camelCase) rather than Rust conventions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::PostId;

/// An identifier as it appears on the wire.
///
/// Stores emit textual ids, but older exports and fixtures carry plain
/// numbers. Either way the view-model only ever sees the stringified form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    /// A numeric identifier.
    Number(i64),
    /// A textual identifier.
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&PostId> for RemoteId {
    fn from(id: &PostId) -> Self {
        Self::Text(id.to_string())
    }
}

impl Default for RemoteId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Cover image record embedded in a remote post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCoverImage {
    /// Asset id assigned by the image host.
    #[serde(default)]
    pub id: String,
    /// Public id (path) of the image on the image host.
    #[serde(default)]
    pub path: String,
    /// Attribution name.
    #[serde(default)]
    pub ref_name: String,
    /// Attribution link.
    #[serde(default)]
    pub ref_url: String,
}

/// A related post as embedded in a full post view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPostRecord {
    /// Identifier of the related post.
    #[serde(rename = "_id")]
    pub id: RemoteId,
    /// Title of the related post.
    #[serde(default)]
    pub title: String,
}

/// Lightweight post record used by listings.
///
/// Carries no body, visibility, license or related posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadataDocument {
    /// Post identifier.
    #[serde(rename = "_id")]
    pub id: RemoteId,
    /// Post title.
    #[serde(default)]
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Short description.
    #[serde(default)]
    pub desc: String,
    /// Tags, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Topic id, empty when unclassified.
    #[serde(default)]
    pub topic: String,
    /// Number of stars the post has received.
    #[serde(default)]
    pub stars: i64,
    /// Body format identifier.
    #[serde(default)]
    pub format: String,
    /// Author identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    /// Cover image, if one is set.
    #[serde(default)]
    pub cover_image: Option<PostCoverImage>,
}

/// Full post record, as returned when a post is opened for editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostObjectView {
    /// Post identifier.
    #[serde(rename = "_id")]
    pub id: RemoteId,
    /// Post title.
    #[serde(default)]
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Short description.
    #[serde(default)]
    pub desc: String,
    /// Tags, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Topic id, empty when unclassified.
    #[serde(default)]
    pub topic: String,
    /// Opaque structured body document.
    #[serde(default)]
    pub body: Option<Value>,
    /// Body format identifier.
    #[serde(default)]
    pub format: String,
    /// Number of stars the post has received.
    #[serde(default)]
    pub stars: i64,
    /// Whether the post is publicly visible.
    #[serde(default)]
    pub public: bool,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Cover image, if one is set.
    #[serde(default)]
    pub cover_image: Option<PostCoverImage>,
    /// Author identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// License identifier, if the record carries one.
    #[serde(default)]
    pub license: Option<String>,
    /// Related posts, if the record carries them.
    #[serde(default)]
    pub related_posts: Option<Vec<RelatedPostRecord>>,
    /// Creation time.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Either of the two remote shapes a post can be hydrated from.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteDocument {
    /// A listing record without body, visibility, license or related posts.
    Summary(PostMetadataDocument),
    /// A complete post record.
    Full(PostObjectView),
}

impl RemoteDocument {
    /// The remote identifier of the document.
    #[must_use]
    pub const fn id(&self) -> &RemoteId {
        match self {
            Self::Summary(doc) => &doc.id,
            Self::Full(doc) => &doc.id,
        }
    }
}

impl From<PostMetadataDocument> for RemoteDocument {
    fn from(doc: PostMetadataDocument) -> Self {
        Self::Summary(doc)
    }
}

impl From<PostObjectView> for RemoteDocument {
    fn from(doc: PostObjectView) -> Self {
        Self::Full(doc)
    }
}

/// Backends encode empty sequences as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
