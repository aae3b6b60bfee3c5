// Save payloads sent to the backend.
//
// Both payloads flatten the cover image into four optional fields and carry
// related posts as bare id strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{CoverImageRef, document::PostCoverImage};

/// Payload for creating a new post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    /// Post title.
    pub title: String,
    /// Normalized URL slug.
    pub slug: String,
    /// Short description.
    pub desc: String,
    /// Tags, in display order.
    pub tags: Vec<String>,
    /// Topic id, empty when unclassified.
    pub topic: String,
    /// Opaque body document.
    pub body: Value,
    /// Body format identifier.
    pub format: String,
    /// Whether the post is public.
    pub public: bool,
    /// Flattened cover image.
    #[serde(flatten)]
    pub cover_image: CoverImageFields,
    /// Author identifier.
    pub author_id: String,
    /// License identifier.
    pub license: String,
    /// Ids of related posts.
    pub related_posts: Vec<String>,
}

/// Payload for updating an existing post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    /// Post title.
    pub title: String,
    /// Normalized URL slug.
    pub slug: String,
    /// Short description.
    pub desc: String,
    /// Tags, in display order.
    pub tags: Vec<String>,
    /// Topic id, empty when unclassified.
    pub topic: String,
    /// Opaque body document.
    pub body: Value,
    /// Whether the post is public.
    pub public: bool,
    /// Flattened cover image.
    #[serde(flatten)]
    pub cover_image: CoverImageFields,
    /// License identifier.
    pub license: String,
    /// Ids of related posts.
    pub related_posts: Vec<String>,
}

/// Cover image sub-fields, flattened into the payload.
///
/// All four are present or all four are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImageFields {
    /// Asset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_id: Option<String>,
    /// Public id (path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
    /// Attribution name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_ref_name: Option<String>,
    /// Attribution link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_ref_url: Option<String>,
}

impl From<Option<&CoverImageRef>> for CoverImageFields {
    fn from(cover: Option<&CoverImageRef>) -> Self {
        cover.map_or_else(Self::default, |cover| Self {
            cover_image_id: Some(cover.asset_id.clone()),
            cover_image_path: Some(cover.public_id.clone()),
            cover_image_ref_name: Some(cover.ref_name.clone()),
            cover_image_ref_url: Some(cover.ref_url.clone()),
        })
    }
}

impl CoverImageFields {
    /// Reassemble the nested record stored by the backend.
    ///
    /// Returns `None` unless an asset id and a path are both present.
    #[must_use]
    pub fn to_record(&self) -> Option<PostCoverImage> {
        match (&self.cover_image_id, &self.cover_image_path) {
            (Some(id), Some(path)) => Some(PostCoverImage {
                id: id.clone(),
                path: path.clone(),
                ref_name: self.cover_image_ref_name.clone().unwrap_or_default(),
                ref_url: self.cover_image_ref_url.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cover() -> CoverImageRef {
        CoverImageRef {
            asset_id: "asset".into(),
            public_id: "covers/abc".into(),
            ref_name: "Jo".into(),
            ref_url: "https://jo.example".into(),
        }
    }

    #[test]
    fn cover_fields_are_flattened() {
        let payload = UpdatePostPayload {
            title: "T".into(),
            slug: "t".into(),
            desc: String::new(),
            tags: vec![],
            topic: String::new(),
            body: Value::Null,
            public: true,
            cover_image: CoverImageFields::from(Some(&cover())),
            license: "CC-BY-4.0".into(),
            related_posts: vec!["1".into()],
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["coverImageId"], json!("asset"));
        assert_eq!(json["coverImagePath"], json!("covers/abc"));
        assert_eq!(json["coverImageRefName"], json!("Jo"));
        assert_eq!(json["coverImageRefUrl"], json!("https://jo.example"));
        assert_eq!(json["relatedPosts"], json!(["1"]));
        assert!(json.get("coverImage").is_none());
    }

    #[test]
    fn absent_cover_omits_all_fields() {
        let fields = CoverImageFields::from(None);
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, json!({}));
        assert!(fields.to_record().is_none());
    }

    #[test]
    fn record_reassembles_cover() {
        let record = CoverImageFields::from(Some(&cover())).to_record().unwrap();
        assert_eq!(CoverImageRef::from(&record), cover());
    }
}
