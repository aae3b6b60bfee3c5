// Backend-agnostic post collection shared by the gateway implementations.

use std::collections::{BTreeMap, btree_map::Entry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{GatewayError, ListOptions, SortBy, UploadedImage};
use crate::domain::{
    CreatePostPayload, ImageFolder, PostCoverImage, PostId, PostMetadataDocument, PostObjectView,
    RelatedPostRecord, RemoteId, UpdatePostPayload, image::detect_format,
};

/// A post as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPost {
    #[serde(rename = "_id")]
    pub id: PostId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub stars: i64,
    pub public: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub cover_image: Option<PostCoverImage>,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub related: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredPost {
    fn from_create(id: PostId, payload: CreatePostPayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            cover_image: payload.cover_image.to_record(),
            title: payload.title,
            slug: payload.slug,
            desc: payload.desc,
            tags: payload.tags,
            topic: payload.topic,
            body: payload.body,
            format: payload.format,
            stars: 0,
            public: payload.public,
            deleted: false,
            author_id: payload.author_id,
            license: payload.license,
            related: payload.related_posts,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, payload: UpdatePostPayload, now: DateTime<Utc>) {
        self.cover_image = payload.cover_image.to_record();
        self.title = payload.title;
        self.slug = payload.slug;
        self.desc = payload.desc;
        self.tags = payload.tags;
        self.topic = payload.topic;
        self.body = payload.body;
        self.public = payload.public;
        self.license = payload.license;
        self.related = payload.related_posts;
        self.updated_at = now;
    }

    pub fn metadata(&self) -> PostMetadataDocument {
        PostMetadataDocument {
            id: RemoteId::from(&self.id),
            title: self.title.clone(),
            slug: self.slug.clone(),
            desc: self.desc.clone(),
            tags: self.tags.clone(),
            topic: self.topic.clone(),
            stars: self.stars,
            format: self.format.clone(),
            author_id: (!self.author_id.is_empty()).then(|| self.author_id.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
            cover_image: self.cover_image.clone(),
        }
    }
}

/// An ordered collection of posts with the query semantics of the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostStore {
    posts: BTreeMap<PostId, StoredPost>,
}

impl PostStore {
    pub fn from_posts(posts: impl IntoIterator<Item = StoredPost>) -> Self {
        Self {
            posts: posts.into_iter().map(|post| (post.id.clone(), post)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn get(&self, id: &PostId) -> Result<&StoredPost, GatewayError> {
        self.posts
            .get(id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    /// A new post for `payload`, not yet added to the store.
    pub fn draft_create(payload: CreatePostPayload, now: DateTime<Utc>) -> StoredPost {
        StoredPost::from_create(PostId::generate(), payload, now)
    }

    /// A modified copy of an existing post. The store itself is unchanged
    /// until the copy is committed.
    pub fn draft(
        &self,
        id: &PostId,
        change: impl FnOnce(&mut StoredPost),
    ) -> Result<StoredPost, GatewayError> {
        let mut post = self.get(id)?.clone();
        change(&mut post);
        Ok(post)
    }

    pub fn draft_update(
        &self,
        id: &PostId,
        payload: UpdatePostPayload,
        now: DateTime<Utc>,
    ) -> Result<StoredPost, GatewayError> {
        self.draft(id, |post| post.apply_update(payload, now))
    }

    /// Add or replace a post.
    pub fn commit(&mut self, post: StoredPost) -> &StoredPost {
        match self.posts.entry(post.id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(post);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(post),
        }
    }

    pub fn create(&mut self, payload: CreatePostPayload, now: DateTime<Utc>) -> &StoredPost {
        self.commit(Self::draft_create(payload, now))
    }

    pub fn update(
        &mut self,
        id: &PostId,
        payload: UpdatePostPayload,
        now: DateTime<Utc>,
    ) -> Result<&StoredPost, GatewayError> {
        let post = self.draft_update(id, payload, now)?;
        Ok(self.commit(post))
    }

    pub fn set_visibility(
        &mut self,
        id: &PostId,
        public: bool,
    ) -> Result<&StoredPost, GatewayError> {
        let post = self.draft(id, |post| post.public = public)?;
        Ok(self.commit(post))
    }

    pub fn set_deleted(
        &mut self,
        id: &PostId,
        deleted: bool,
    ) -> Result<&StoredPost, GatewayError> {
        let post = self.draft(id, |post| post.deleted = deleted)?;
        Ok(self.commit(post))
    }

    /// The full view of a post, with related post ids resolved to titles.
    pub fn view(&self, id: &PostId) -> Result<PostObjectView, GatewayError> {
        let post = self.get(id)?;

        let related_posts = post
            .related
            .iter()
            .filter_map(|raw| {
                let related = raw.parse::<PostId>().ok().and_then(|rid| self.posts.get(&rid));
                if related.is_none() {
                    warn!(post = %post.id, related = %raw, "skipping unknown related post");
                }
                related
            })
            .map(|related| RelatedPostRecord {
                id: RemoteId::from(&related.id),
                title: related.title.clone(),
            })
            .collect();

        Ok(PostObjectView {
            id: RemoteId::from(&post.id),
            title: post.title.clone(),
            slug: post.slug.clone(),
            desc: post.desc.clone(),
            tags: post.tags.clone(),
            topic: post.topic.clone(),
            body: (!post.body.is_null()).then(|| post.body.clone()),
            format: post.format.clone(),
            stars: post.stars,
            public: post.public,
            deleted: post.deleted,
            cover_image: post.cover_image.clone(),
            author_id: (!post.author_id.is_empty()).then(|| post.author_id.clone()),
            license: Some(post.license.clone()),
            related_posts: Some(related_posts),
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    /// The listing record of a post, if it is listed in the given scope.
    pub fn metadata(
        &self,
        id: &PostId,
        private: bool,
    ) -> Result<PostMetadataDocument, GatewayError> {
        self.posts
            .get(id)
            .filter(|post| is_listed(post, private))
            .map(StoredPost::metadata)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    pub fn list(&self, options: &ListOptions) -> Vec<PostMetadataDocument> {
        let mut listed: Vec<&StoredPost> = self
            .posts
            .values()
            .filter(|post| is_listed(post, options.private))
            .filter(|post| options.topic.as_ref().is_none_or(|topic| &post.topic == topic))
            .collect();

        match options.sort_by {
            SortBy::Title => listed.sort_by(|a, b| a.title.cmp(&b.title)),
            SortBy::Topic => listed.sort_by(|a, b| a.topic.cmp(&b.topic)),
            SortBy::Newest => listed.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Oldest => listed.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortBy::Updated => listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = match options.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };

        listed
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(StoredPost::metadata)
            .collect()
    }

    pub fn count(&self, public: bool, include_deleted: bool) -> u64 {
        let count = self
            .posts
            .values()
            .filter(|post| post.public == public && (include_deleted || !post.deleted))
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }
}

fn is_listed(post: &StoredPost, private: bool) -> bool {
    !post.deleted && post.public != private
}

/// Validate an upload and assign it a public id inside `folder`.
pub fn prepare_upload(
    folder: ImageFolder,
    data: &[u8],
) -> Result<UploadedImage, GatewayError> {
    let format = detect_format(data).ok_or(GatewayError::UnsupportedImage)?;
    let asset_id = uuid::Uuid::new_v4().simple().to_string();
    Ok(UploadedImage {
        public_id: format!("{folder}/{}", &asset_id[..20]),
        asset_id,
        format: format.to_string(),
    })
}

/// Split a public id into its upload folder and image name.
///
/// Only ids of the shape produced by [`prepare_upload`] are accepted, so a
/// public id can never address anything outside its folder.
pub fn split_image_id(public_id: &str) -> Result<(ImageFolder, &str), GatewayError> {
    let invalid = || GatewayError::InvalidImageId(public_id.to_string());
    let (folder, name) = public_id.split_once('/').ok_or_else(invalid)?;
    let folder = [ImageFolder::Cover, ImageFolder::Embed]
        .into_iter()
        .find(|candidate| candidate.as_str() == folder)
        .ok_or_else(invalid)?;
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid_name { Ok((folder, name)) } else { Err(invalid()) }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::domain::CoverImageFields;

    #[test]
    fn prepare_upload_places_image_in_folder() {
        let upload = prepare_upload(ImageFolder::Cover, b"GIF89a...").unwrap();
        assert!(upload.public_id.starts_with("post-cover-images/"));
        assert_eq!(upload.format, "gif");
        assert_eq!(upload.asset_id.len(), 32);
    }

    #[test]
    fn uploaded_ids_split_into_folder_and_name() {
        let upload = prepare_upload(ImageFolder::Embed, b"\x89PNG\r\n\x1a\n").unwrap();
        let (folder, name) = split_image_id(&upload.public_id).unwrap();
        assert_eq!(folder, ImageFolder::Embed);
        assert_eq!(name.len(), 20);
    }

    #[test_case(""; "empty")]
    #[test_case("post-images"; "folder only")]
    #[test_case("post-images/"; "empty name")]
    #[test_case("../fconsole"; "parent of images")]
    #[test_case("post-images/../../fconsole"; "escapes folder")]
    #[test_case("/etc/passwd"; "absolute")]
    #[test_case("posts/abc"; "unknown folder")]
    #[test_case("post-cover-images/a/b"; "nested")]
    #[test_case("post-cover-images/a.png"; "extension")]
    fn malformed_image_ids_are_rejected(public_id: &str) {
        assert!(matches!(
            split_image_id(public_id),
            Err(GatewayError::InvalidImageId(id)) if id == public_id
        ));
    }

    #[test]
    fn draft_leaves_store_unchanged_until_committed() {
        let (mut store, ids) = seeded();
        let hidden = store.draft(&ids[0], |post| post.public = false).unwrap();
        assert!(store.get(&ids[0]).unwrap().public);

        store.commit(hidden);
        assert!(!store.get(&ids[0]).unwrap().public);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn prepare_upload_rejects_non_images() {
        assert!(matches!(
            prepare_upload(ImageFolder::Embed, b"hello"),
            Err(GatewayError::UnsupportedImage)
        ));
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, day, 12, 0, 0).unwrap()
    }

    fn payload(title: &str, topic: &str, public: bool) -> CreatePostPayload {
        CreatePostPayload {
            title: title.into(),
            slug: title.to_lowercase(),
            desc: String::new(),
            tags: vec![],
            topic: topic.into(),
            body: json!({"blocks": []}),
            format: "editorjs".into(),
            public,
            cover_image: CoverImageFields::default(),
            author_id: "admin".into(),
            license: "CC-BY-4.0".into(),
            related_posts: vec![],
        }
    }

    fn titles(docs: &[PostMetadataDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.title.as_str()).collect()
    }

    fn seeded() -> (PostStore, Vec<PostId>) {
        let mut store = PostStore::default();
        let ids = vec![
            store.create(payload("Beta", "science", true), at(2)).id.clone(),
            store.create(payload("Alpha", "programming", true), at(3)).id.clone(),
            store.create(payload("Gamma", "science", true), at(1)).id.clone(),
            store.create(payload("Secret", "science", false), at(4)).id.clone(),
        ];
        (store, ids)
    }

    #[test]
    fn list_filters_scope_and_topic() {
        let (store, _) = seeded();

        let public = store.list(&ListOptions::default());
        assert_eq!(titles(&public), ["Alpha", "Beta", "Gamma"]);

        let private = store.list(&ListOptions {
            private: true,
            ..ListOptions::default()
        });
        assert_eq!(titles(&private), ["Secret"]);

        let science = store.list(&ListOptions {
            topic: Some("science".into()),
            sort_by: SortBy::Title,
            ..ListOptions::default()
        });
        assert_eq!(titles(&science), ["Beta", "Gamma"]);
    }

    #[test]
    fn list_sorts_limits_and_skips() {
        let (store, _) = seeded();

        let oldest = store.list(&ListOptions {
            sort_by: SortBy::Oldest,
            ..ListOptions::default()
        });
        assert_eq!(titles(&oldest), ["Gamma", "Beta", "Alpha"]);

        let page = store.list(&ListOptions {
            sort_by: SortBy::Title,
            limit: 1,
            skip: 1,
            ..ListOptions::default()
        });
        assert_eq!(titles(&page), ["Beta"]);
    }

    #[test]
    fn updated_sort_follows_modification_time() {
        let (mut store, ids) = seeded();
        let update = UpdatePostPayload {
            title: "Gamma".into(),
            slug: "gamma".into(),
            desc: String::new(),
            tags: vec![],
            topic: "science".into(),
            body: Value::Null,
            public: true,
            cover_image: CoverImageFields::default(),
            license: "MIT".into(),
            related_posts: vec![],
        };
        store.update(&ids[2], update, at(9)).unwrap();

        let updated = store.list(&ListOptions {
            sort_by: SortBy::Updated,
            ..ListOptions::default()
        });
        assert_eq!(titles(&updated), ["Gamma", "Alpha", "Beta"]);
        assert_eq!(store.get(&ids[2]).unwrap().license, "MIT");
    }

    #[test]
    fn deleted_posts_are_not_listed_but_still_viewable() {
        let (mut store, ids) = seeded();
        store.set_deleted(&ids[0], true).unwrap();

        assert_eq!(titles(&store.list(&ListOptions::default())), ["Alpha", "Gamma"]);
        assert!(matches!(
            store.metadata(&ids[0], false),
            Err(GatewayError::NotFound(_))
        ));
        assert!(store.view(&ids[0]).unwrap().deleted);
        assert_eq!(store.count(true, false), 2);
        assert_eq!(store.count(true, true), 3);
    }

    #[test]
    fn metadata_respects_scope() {
        let (store, ids) = seeded();
        assert!(store.metadata(&ids[3], true).is_ok());
        assert!(store.metadata(&ids[3], false).is_err());
    }

    #[test]
    fn view_resolves_related_posts_and_skips_unknown() {
        let (mut store, ids) = seeded();
        let mut with_related = payload("Linked", "science", true);
        with_related.related_posts = vec![ids[1].to_string(), "missing".into(), ids[0].to_string()];
        let linked = store.create(with_related, at(5)).id.clone();

        let view = store.view(&linked).unwrap();
        let related = view.related_posts.unwrap();

        assert_eq!(
            related.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            ["Alpha", "Beta"]
        );
        assert_eq!(related[0].id.to_string(), ids[1].to_string());
    }

    #[test]
    fn update_unknown_post_is_not_found() {
        let mut store = PostStore::default();
        let id: PostId = "nope".parse().unwrap();
        assert!(matches!(
            store.set_visibility(&id, false),
            Err(GatewayError::NotFound(_))
        ));
    }
}
