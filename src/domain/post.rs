use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{document::PostCoverImage, slug::compute_slug};

/// License applied to posts that do not name one.
pub const DEFAULT_LICENSE: &str = "CC-BY-4.0";

/// Body format produced by the block editor.
pub const DEFAULT_FORMAT: &str = "editorjs";

/// The in-progress edit of a single post.
///
/// Every form section of the editor reads and writes a slice of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditablePost {
    /// Post title.
    pub title: String,
    /// URL slug. Derived from the title when left empty.
    pub slug: String,
    /// Topic id, if the post is classified.
    pub topic: Option<String>,
    /// Short description.
    pub description: String,
    /// Tags, in display order.
    pub tags: Vec<String>,
    /// `true` if the post is public.
    pub visibility: bool,
    /// Opaque body document owned by the body editor.
    pub body: Option<Value>,
    /// License identifier.
    pub license: String,
    /// Cover image, either fully present or absent.
    pub cover_image: Option<CoverImageRef>,
    /// Lightweight references to related posts.
    pub related_posts: Vec<RelatedPost>,
}

impl Default for EditablePost {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            topic: None,
            description: String::new(),
            tags: Vec::new(),
            visibility: true,
            body: None,
            license: DEFAULT_LICENSE.to_string(),
            cover_image: None,
            related_posts: Vec::new(),
        }
    }
}

impl EditablePost {
    /// The slug that will be sent on save.
    ///
    /// An explicit slug is normalized; an empty one is derived from the title.
    #[must_use]
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            compute_slug(&self.title)
        } else {
            compute_slug(&self.slug)
        }
    }

    /// The license that will be sent on save.
    #[must_use]
    pub fn effective_license(&self) -> &str {
        let license = self.license.trim();
        if license.is_empty() {
            DEFAULT_LICENSE
        } else {
            license
        }
    }

    /// Add a tag.
    ///
    /// The tag is trimmed first. Returns `false` if it was blank or already
    /// present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag, returning `true` if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag.trim());
        self.tags.len() != before
    }

    /// Add a related post.
    ///
    /// Returns `false` if a post with the same id is already related.
    pub fn add_related_post(&mut self, related: RelatedPost) -> bool {
        if self.related_posts.iter().any(|r| r.id == related.id) {
            return false;
        }
        self.related_posts.push(related);
        true
    }

    /// Remove the related post with the given id, returning it if present.
    pub fn remove_related_post(&mut self, id: &str) -> Option<RelatedPost> {
        let index = self.related_posts.iter().position(|r| r.id == id)?;
        Some(self.related_posts.remove(index))
    }

    /// Replace the cover image, returning the previous one.
    pub fn set_cover_image(&mut self, cover: CoverImageRef) -> Option<CoverImageRef> {
        self.cover_image.replace(cover)
    }

    /// Clear the cover image, returning the previous one.
    pub fn clear_cover_image(&mut self) -> Option<CoverImageRef> {
        self.cover_image.take()
    }
}

/// Reference to a hosted cover image and its attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImageRef {
    /// Asset id assigned by the image host.
    pub asset_id: String,
    /// Public id (path) of the image on the image host.
    pub public_id: String,
    /// Attribution name.
    pub ref_name: String,
    /// Attribution link.
    pub ref_url: String,
}

impl From<&PostCoverImage> for CoverImageRef {
    fn from(cover: &PostCoverImage) -> Self {
        Self {
            asset_id: cover.id.clone(),
            public_id: cover.path.clone(),
            ref_name: cover.ref_name.clone(),
            ref_url: cover.ref_url.clone(),
        }
    }
}

/// A lightweight reference to another post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPost {
    /// Display label (the related post's title).
    pub label: String,
    /// Stringified id of the related post.
    pub id: String,
}

impl RelatedPost {
    /// Create a related post reference.
    #[must_use]
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}
