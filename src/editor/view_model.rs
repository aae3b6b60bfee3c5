//! The editor view-model.
//!
//! [`EditorViewModel`] holds the in-progress edit of one post. It is hydrated
//! from either remote shape, reset between sessions, and exported into the
//! save payloads the backend expects.

use serde_json::Value;
use tracing::debug;

use crate::domain::{
    CoverImageFields, CoverImageRef, CreatePostPayload, DEFAULT_FORMAT, EditablePost,
    PostCoverImage, PostMetadataDocument, PostObjectView, RelatedPost, RelatedPostRecord,
    RemoteDocument, UpdatePostPayload,
};

/// What hydrating a document without a cover image does to the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoverImagePolicy {
    /// Leave the current cover image untouched.
    ///
    /// A cover image set by an earlier edit survives opening a post that has
    /// none.
    #[default]
    Preserve,
    /// Clear the current cover image.
    Clear,
}

/// Editable state of the post currently open in the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorViewModel {
    post: EditablePost,
    cover_policy: CoverImagePolicy,
}

impl EditorViewModel {
    /// Create a view-model holding the default post.
    #[must_use]
    pub fn new(cover_policy: CoverImagePolicy) -> Self {
        Self {
            post: EditablePost::default(),
            cover_policy,
        }
    }

    /// The current fields.
    #[must_use]
    pub const fn post(&self) -> &EditablePost {
        &self.post
    }

    /// Mutable access for form sections.
    pub const fn post_mut(&mut self) -> &mut EditablePost {
        &mut self.post
    }

    /// Overwrite the fields from a remote document.
    ///
    /// Scalars are always copied. Composite fields are only touched when the
    /// document carries them: a summary never changes visibility, body,
    /// license or related posts. Missing fields are never an error.
    pub fn hydrate(&mut self, document: &RemoteDocument) {
        match document {
            RemoteDocument::Summary(doc) => self.hydrate_summary(doc),
            RemoteDocument::Full(doc) => self.hydrate_full(doc),
        }
        debug!(id = %document.id(), title = %self.post.title, "hydrated editor");
    }

    fn hydrate_summary(&mut self, doc: &PostMetadataDocument) {
        self.copy_scalars(&doc.title, &doc.slug, &doc.topic, &doc.desc, &doc.tags);
        self.patch_cover_image(doc.cover_image.as_ref());
    }

    fn hydrate_full(&mut self, doc: &PostObjectView) {
        self.copy_scalars(&doc.title, &doc.slug, &doc.topic, &doc.desc, &doc.tags);
        self.post.visibility = doc.public;
        self.post.body.clone_from(&doc.body);
        if let Some(license) = &doc.license {
            self.post.license.clone_from(license);
        }
        self.patch_cover_image(doc.cover_image.as_ref());
        if let Some(related) = &doc.related_posts {
            self.post.related_posts = related.iter().map(related_post).collect();
        }
    }

    fn copy_scalars(&mut self, title: &str, slug: &str, topic: &str, desc: &str, tags: &[String]) {
        let post = &mut self.post;
        title.clone_into(&mut post.title);
        slug.clone_into(&mut post.slug);
        post.topic = (!topic.is_empty()).then(|| topic.to_string());
        desc.clone_into(&mut post.description);
        post.tags = tags.to_vec();
    }

    fn patch_cover_image(&mut self, cover: Option<&PostCoverImage>) {
        match (cover, self.cover_policy) {
            (Some(cover), _) => self.post.cover_image = Some(CoverImageRef::from(cover)),
            (None, CoverImagePolicy::Clear) => self.post.cover_image = None,
            (None, CoverImagePolicy::Preserve) => {}
        }
    }

    /// Restore every field to its default. Idempotent.
    pub fn reset(&mut self) {
        self.post = EditablePost::default();
        debug!("reset editor");
    }

    /// Build the payload for saving changes to an existing post.
    #[must_use]
    pub fn update_payload(&self) -> UpdatePostPayload {
        let post = &self.post;
        UpdatePostPayload {
            title: post.title.clone(),
            slug: post.effective_slug(),
            desc: post.description.clone(),
            tags: post.tags.clone(),
            topic: post.topic.clone().unwrap_or_default(),
            body: post.body.clone().unwrap_or(Value::Null),
            public: post.visibility,
            cover_image: CoverImageFields::from(post.cover_image.as_ref()),
            license: post.effective_license().to_string(),
            related_posts: related_ids(&post.related_posts),
        }
    }

    /// Build the payload for creating a new post attributed to `author_id`.
    #[must_use]
    pub fn create_payload(&self, author_id: impl Into<String>) -> CreatePostPayload {
        let UpdatePostPayload {
            title,
            slug,
            desc,
            tags,
            topic,
            body,
            public,
            cover_image,
            license,
            related_posts,
        } = self.update_payload();

        CreatePostPayload {
            title,
            slug,
            desc,
            tags,
            topic,
            body,
            format: DEFAULT_FORMAT.to_string(),
            public,
            cover_image,
            author_id: author_id.into(),
            license,
            related_posts,
        }
    }
}

fn related_post(record: &RelatedPostRecord) -> RelatedPost {
    RelatedPost {
        label: record.title.clone(),
        id: record.id.to_string(),
    }
}

fn related_ids(related: &[RelatedPost]) -> Vec<String> {
    related.iter().map(|r| r.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{DEFAULT_LICENSE, RemoteId};

    fn cover(tag: &str) -> PostCoverImage {
        PostCoverImage {
            id: format!("{tag}-asset"),
            path: format!("covers/{tag}"),
            ref_name: format!("{tag} name"),
            ref_url: format!("https://{tag}.example"),
        }
    }

    fn full_view() -> PostObjectView {
        PostObjectView {
            id: RemoteId::Text("p1".into()),
            title: "Ownership".into(),
            slug: "ownership".into(),
            desc: "Borrowing explained".into(),
            tags: vec!["rust".into(), "memory".into()],
            topic: "programming".into(),
            body: Some(json!({"blocks": [{"type": "paragraph"}]})),
            public: false,
            license: Some("MIT".into()),
            cover_image: Some(cover("full")),
            related_posts: Some(vec![
                RelatedPostRecord {
                    id: RemoteId::Number(1),
                    title: "A".into(),
                },
                RelatedPostRecord {
                    id: RemoteId::Number(2),
                    title: "B".into(),
                },
            ]),
            ..PostObjectView::default()
        }
    }

    fn summary() -> PostMetadataDocument {
        PostMetadataDocument {
            id: RemoteId::Text("p2".into()),
            title: "Summary".into(),
            slug: "summary".into(),
            desc: "Only metadata".into(),
            tags: vec!["z".into(), "a".into()],
            topic: "science".into(),
            ..PostMetadataDocument::default()
        }
    }

    fn assert_defaults(vm: &EditorViewModel) {
        let post = vm.post();
        assert_eq!(post.title, "");
        assert_eq!(post.slug, "");
        assert_eq!(post.topic, None);
        assert_eq!(post.description, "");
        assert!(post.tags.is_empty());
        assert!(post.visibility);
        assert_eq!(post.body, None);
        assert_eq!(post.license, DEFAULT_LICENSE);
        assert_eq!(post.cover_image, None);
        assert!(post.related_posts.is_empty());
    }

    #[test]
    fn reset_restores_defaults_and_is_idempotent() {
        let mut vm = EditorViewModel::default();
        assert_defaults(&vm);

        vm.hydrate(&full_view().into());
        vm.reset();
        assert_defaults(&vm);

        vm.reset();
        assert_defaults(&vm);
    }

    #[test]
    fn full_view_sets_body_license_and_related_posts() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let post = vm.post();
        assert_eq!(post.body, Some(json!({"blocks": [{"type": "paragraph"}]})));
        assert_eq!(post.license, "MIT");
        assert!(!post.visibility);
        assert_eq!(
            post.related_posts,
            vec![RelatedPost::new("A", "1"), RelatedPost::new("B", "2")]
        );
    }

    #[test]
    fn full_view_round_trips_mapped_fields() {
        let view = full_view();
        let mut vm = EditorViewModel::default();
        vm.reset();
        vm.hydrate(&view.clone().into());

        let post = vm.post();
        assert_eq!(post.title, view.title);
        assert_eq!(post.slug, view.slug);
        assert_eq!(post.topic.as_deref(), Some(view.topic.as_str()));
        assert_eq!(post.description, view.desc);
        assert_eq!(post.tags, view.tags);
        assert_eq!(post.visibility, view.public);
        assert_eq!(
            post.cover_image,
            view.cover_image.as_ref().map(CoverImageRef::from)
        );
    }

    #[test]
    fn summary_round_trips_scalars_and_leaves_the_rest() {
        let doc = summary();
        let mut vm = EditorViewModel::default();
        vm.reset();
        vm.hydrate(&doc.clone().into());

        let post = vm.post();
        assert_eq!(post.title, doc.title);
        assert_eq!(post.slug, doc.slug);
        assert_eq!(post.topic.as_deref(), Some("science"));
        assert_eq!(post.description, doc.desc);
        assert_eq!(post.tags, vec!["z", "a"]);
        assert!(post.visibility);
        assert_eq!(post.body, None);
        assert_eq!(post.license, DEFAULT_LICENSE);
        assert!(post.related_posts.is_empty());
    }

    #[test]
    fn summary_does_not_touch_full_view_fields() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());
        vm.hydrate(&summary().into());

        let post = vm.post();
        assert_eq!(post.title, "Summary");
        assert!(!post.visibility);
        assert_eq!(post.license, "MIT");
        assert_eq!(post.related_posts.len(), 2);
        assert!(post.body.is_some());
    }

    #[test]
    fn absent_cover_image_is_preserved_by_default() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let mut without_cover = full_view();
        without_cover.cover_image = None;
        vm.hydrate(&without_cover.into());

        assert_eq!(
            vm.post().cover_image,
            Some(CoverImageRef::from(&cover("full")))
        );
    }

    #[test]
    fn absent_cover_image_is_cleared_under_clear_policy() {
        let mut vm = EditorViewModel::new(CoverImagePolicy::Clear);
        vm.hydrate(&full_view().into());

        vm.hydrate(&summary().into());

        assert_eq!(vm.post().cover_image, None);
    }

    #[test]
    fn present_cover_image_overwrites_all_fields() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let mut doc = summary();
        doc.cover_image = Some(cover("other"));
        vm.hydrate(&doc.into());

        let cover_ref = vm.post().cover_image.clone().unwrap();
        assert_eq!(cover_ref.asset_id, "other-asset");
        assert_eq!(cover_ref.public_id, "covers/other");
        assert_eq!(cover_ref.ref_name, "other name");
        assert_eq!(cover_ref.ref_url, "https://other.example");
    }

    #[test]
    fn missing_related_posts_leave_existing_ones() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let mut view = full_view();
        view.related_posts = None;
        view.license = None;
        vm.hydrate(&view.into());

        assert_eq!(vm.post().related_posts.len(), 2);
        assert_eq!(vm.post().license, "MIT");
    }

    #[test]
    fn empty_related_posts_clear_existing_ones() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let mut view = full_view();
        view.related_posts = Some(Vec::new());
        vm.hydrate(&view.into());

        assert!(vm.post().related_posts.is_empty());
    }

    #[test]
    fn empty_remote_topic_hydrates_as_none() {
        let mut vm = EditorViewModel::default();
        let mut doc = summary();
        doc.topic = String::new();
        vm.hydrate(&doc.into());
        assert_eq!(vm.post().topic, None);
    }

    #[test]
    fn update_payload_maps_every_field() {
        let mut vm = EditorViewModel::default();
        vm.hydrate(&full_view().into());

        let payload = vm.update_payload();

        assert_eq!(payload.title, "Ownership");
        assert_eq!(payload.slug, "ownership");
        assert_eq!(payload.desc, "Borrowing explained");
        assert_eq!(payload.tags, vec!["rust", "memory"]);
        assert_eq!(payload.topic, "programming");
        assert_eq!(payload.body, json!({"blocks": [{"type": "paragraph"}]}));
        assert!(!payload.public);
        assert_eq!(payload.license, "MIT");
        assert_eq!(payload.related_posts, vec!["1", "2"]);
        assert_eq!(
            payload.cover_image.cover_image_path.as_deref(),
            Some("covers/full")
        );
    }

    #[test]
    fn payload_normalizes_derived_fields() {
        let mut vm = EditorViewModel::default();
        {
            let post = vm.post_mut();
            post.title = "Hello Async World".into();
            post.license = String::new();
        }

        let payload = vm.create_payload("author-1");

        assert_eq!(payload.slug, "hello-async-world");
        assert_eq!(payload.license, DEFAULT_LICENSE);
        assert_eq!(payload.topic, "");
        assert_eq!(payload.body, Value::Null);
        assert!(payload.public);
        assert_eq!(payload.format, DEFAULT_FORMAT);
        assert_eq!(payload.author_id, "author-1");
        assert_eq!(payload.cover_image, CoverImageFields::default());
    }

    #[test]
    fn export_does_not_reorder_or_duplicate_tags() {
        let mut vm = EditorViewModel::default();
        let mut doc = summary();
        doc.tags = vec!["c".into(), "a".into(), "b".into()];
        vm.hydrate(&doc.into());

        assert_eq!(vm.update_payload().tags, vec!["c", "a", "b"]);
    }

    #[test]
    fn example_related_posts_mapping() {
        let raw = json!({
            "_id": "p",
            "relatedPosts": [{"title": "A", "_id": 1}, {"title": "B", "_id": 2}]
        });
        let view: PostObjectView = serde_json::from_value(raw).unwrap();

        let mut vm = EditorViewModel::default();
        vm.hydrate(&RemoteDocument::Full(view));

        assert_eq!(
            vm.post().related_posts,
            vec![
                RelatedPost {
                    label: "A".into(),
                    id: "1".into()
                },
                RelatedPost {
                    label: "B".into(),
                    id: "2".into()
                },
            ]
        );
    }
}
