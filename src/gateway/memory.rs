use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    GatewayError, ListOptions, PostGateway, UploadedImage,
    store::{PostStore, prepare_upload},
};
use crate::domain::{
    CreatePostPayload, ImageFolder, PostId, PostMetadataDocument, PostObjectView, PublicConfig,
    UpdatePostPayload,
};

/// A gateway that keeps posts and images in process memory.
///
/// Nothing survives the process. Useful for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: RwLock<PostStore>,
    images: RwLock<BTreeMap<String, UploadedImage>>,
    config: PublicConfig,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty gateway reporting the given configuration.
    #[must_use]
    pub fn with_config(config: PublicConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Whether an image with the given public id is stored.
    pub async fn has_image(&self, public_id: &str) -> bool {
        self.images.read().await.contains_key(public_id)
    }

    /// Number of stored posts, including deleted ones.
    pub async fn post_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl PostGateway for MemoryGateway {
    async fn fetch_post(&self, id: &PostId) -> Result<PostObjectView, GatewayError> {
        self.store.read().await.view(id)
    }

    async fn fetch_metadata(
        &self,
        id: &PostId,
        private: bool,
    ) -> Result<PostMetadataDocument, GatewayError> {
        self.store.read().await.metadata(id, private)
    }

    async fn list_metadata(
        &self,
        options: &ListOptions,
    ) -> Result<Vec<PostMetadataDocument>, GatewayError> {
        Ok(self.store.read().await.list(options))
    }

    async fn create_post(&self, payload: CreatePostPayload) -> Result<PostId, GatewayError> {
        let id = self
            .store
            .write()
            .await
            .create(payload, Utc::now())
            .id
            .clone();
        info!(%id, "created post");
        Ok(id)
    }

    async fn update_post(
        &self,
        id: &PostId,
        payload: UpdatePostPayload,
    ) -> Result<(), GatewayError> {
        self.store.write().await.update(id, payload, Utc::now())?;
        info!(%id, "updated post");
        Ok(())
    }

    async fn set_visibility(&self, id: &PostId, public: bool) -> Result<(), GatewayError> {
        self.store.write().await.set_visibility(id, public)?;
        Ok(())
    }

    async fn set_deleted(&self, id: &PostId, deleted: bool) -> Result<(), GatewayError> {
        self.store.write().await.set_deleted(id, deleted)?;
        Ok(())
    }

    async fn count_posts(&self, public: bool, include_deleted: bool) -> Result<u64, GatewayError> {
        Ok(self.store.read().await.count(public, include_deleted))
    }

    async fn upload_image(
        &self,
        folder: ImageFolder,
        data: Vec<u8>,
    ) -> Result<UploadedImage, GatewayError> {
        let upload = prepare_upload(folder, &data)?;
        debug!(public_id = %upload.public_id, bytes = data.len(), "stored image");
        self.images
            .write()
            .await
            .insert(upload.public_id.clone(), upload.clone());
        Ok(upload)
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), GatewayError> {
        self.images
            .write()
            .await
            .remove(public_id)
            .map(|_| debug!(%public_id, "deleted image"))
            .ok_or_else(|| GatewayError::ImageNotFound(public_id.to_string()))
    }

    async fn app_config(&self) -> Result<PublicConfig, GatewayError> {
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{CoverImageFields, RemoteDocument};

    fn payload(title: &str) -> CreatePostPayload {
        CreatePostPayload {
            title: title.into(),
            slug: title.to_lowercase(),
            desc: "d".into(),
            tags: vec!["t".into()],
            topic: "science".into(),
            body: json!({"blocks": []}),
            format: "editorjs".into(),
            public: true,
            cover_image: CoverImageFields {
                cover_image_id: Some("a".into()),
                cover_image_path: Some("p".into()),
                cover_image_ref_name: Some("n".into()),
                cover_image_ref_url: Some("u".into()),
            },
            author_id: "admin".into(),
            license: "MIT".into(),
            related_posts: vec![],
        }
    }

    #[tokio::test]
    async fn created_post_can_be_fetched_in_both_shapes() {
        let gateway = MemoryGateway::new();
        let id = gateway.create_post(payload("First")).await.unwrap();

        let full = gateway.fetch_post(&id).await.unwrap();
        assert_eq!(full.title, "First");
        assert_eq!(full.license.as_deref(), Some("MIT"));
        assert_eq!(full.cover_image.unwrap().path, "p");

        let summary = gateway.fetch_metadata(&id, false).await.unwrap();
        assert_eq!(RemoteDocument::from(summary).id().to_string(), id.to_string());
        assert!(gateway.fetch_metadata(&id, true).await.is_err());
    }

    #[tokio::test]
    async fn visibility_moves_post_between_scopes() {
        let gateway = MemoryGateway::new();
        let id = gateway.create_post(payload("Moving")).await.unwrap();

        gateway.set_visibility(&id, false).await.unwrap();

        let private = gateway
            .list_metadata(&ListOptions {
                private: true,
                ..ListOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(private.len(), 1);
        assert_eq!(gateway.count_posts(true, true).await.unwrap(), 0);
        assert_eq!(gateway.count_posts(false, false).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn images_can_be_uploaded_and_deleted_once() {
        let gateway = MemoryGateway::new();
        let image = gateway
            .upload_image(ImageFolder::Cover, b"\x89PNG\r\n\x1a\n".to_vec())
            .await
            .unwrap();

        assert!(gateway.has_image(&image.public_id).await);
        gateway.delete_image(&image.public_id).await.unwrap();
        assert!(!gateway.has_image(&image.public_id).await);
        assert!(matches!(
            gateway.delete_image(&image.public_id).await,
            Err(GatewayError::ImageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_of_unknown_post_fails() {
        let gateway = MemoryGateway::new();
        let id: PostId = "missing".parse().unwrap();
        let payload = UpdatePostPayload {
            title: String::new(),
            slug: String::new(),
            desc: String::new(),
            tags: vec![],
            topic: String::new(),
            body: serde_json::Value::Null,
            public: true,
            cover_image: CoverImageFields::default(),
            license: String::new(),
            related_posts: vec![],
        };
        assert!(matches!(
            gateway.update_post(&id, payload).await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reports_configured_variables() {
        let gateway = MemoryGateway::with_config(PublicConfig {
            env: "prod".into(),
            admin_id: "admin".into(),
            cloudinary_id: "demo".into(),
        });
        let config = gateway.app_config().await.unwrap();
        assert_eq!(config.variable("CLOUDINARY_ID", ""), "demo");
    }
}
