//! A directory-backed post gateway.
//!
//! Layout of a store:
//!
//! ```text
//! <root>/fconsole.toml                 configuration
//! <root>/posts/<id>.json               one file per post
//! <root>/images/<folder>/<name>.<ext>  uploaded images
//! ```
//!
//! All posts are loaded into memory when the store is opened. Every mutation
//! rewrites the affected post file, and the in-memory copy only changes once
//! that write has succeeded.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use super::{
    GatewayError, ListOptions, PostGateway, UploadedImage,
    store::{PostStore, StoredPost, prepare_upload, split_image_id},
};
use crate::domain::{
    Config, CreatePostPayload, ImageFolder, PostId, PostMetadataDocument, PostObjectView,
    PublicConfig, UpdatePostPayload,
};

/// Name of the configuration file in the store root.
pub const CONFIG_FILE: &str = "fconsole.toml";

const POSTS_DIR: &str = "posts";
const IMAGES_DIR: &str = "images";

/// A gateway persisting posts as JSON files in a directory.
#[derive(Debug)]
pub struct FileGateway {
    root: PathBuf,
    config: Config,
    store: RwLock<PostStore>,
}

impl FileGateway {
    /// Create the store layout at `root` and write `config` if no
    /// configuration exists yet.
    ///
    /// Returns `true` if a new configuration file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the configuration cannot be
    /// written.
    pub fn init(root: &Path, config: &Config) -> Result<bool, GatewayError> {
        for dir in [root.join(POSTS_DIR), root.join(IMAGES_DIR)] {
            fs::create_dir_all(&dir).map_err(|source| GatewayError::Io { path: dir, source })?;
        }

        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(false);
        }
        config.save(&config_path)?;
        Ok(true)
    }

    /// Open the store at `root`, loading every post.
    ///
    /// Environment overrides are applied on top of the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any post file
    /// cannot be read or parsed.
    #[instrument(level = "debug")]
    pub fn open(root: PathBuf) -> Result<Self, GatewayError> {
        let config = Config::load_or_default(&root.join(CONFIG_FILE))?.with_env_overrides();

        let paths = collect_post_paths(&root.join(POSTS_DIR));
        let posts = paths
            .par_iter()
            .map(|path| read_post(path))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = posts.len(), "loaded posts");

        Ok(Self {
            root,
            config,
            store: RwLock::new(PostStore::from_posts(posts)),
        })
    }

    /// The effective configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn post_path(&self, id: &PostId) -> PathBuf {
        self.root.join(POSTS_DIR).join(format!("{id}.json"))
    }

    fn persist(&self, post: &StoredPost) -> Result<(), GatewayError> {
        let path = self.post_path(&post.id);
        let json = serde_json::to_string_pretty(post).map_err(|source| GatewayError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| GatewayError::Io { path, source })
    }

    fn image_path(&self, public_id: &str, format: &str) -> PathBuf {
        self.root
            .join(IMAGES_DIR)
            .join(format!("{public_id}.{format}"))
    }

    /// Find the stored file of an image by its public id, whatever its format.
    fn find_image(&self, public_id: &str) -> Result<Option<PathBuf>, GatewayError> {
        let (folder, name) = split_image_id(public_id)?;
        let dir = self.root.join(IMAGES_DIR).join(folder.as_str());
        let Ok(entries) = fs::read_dir(&dir) else {
            return Ok(None);
        };
        Ok(entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| path.is_file() && path.file_stem().is_some_and(|stem| stem == name)))
    }
}

fn collect_post_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

fn read_post(path: &Path) -> Result<StoredPost, GatewayError> {
    let content = fs::read_to_string(path).map_err(|source| GatewayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| GatewayError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl PostGateway for FileGateway {
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
        let post = PostStore::draft_create(payload, Utc::now());
        let mut store = self.store.write().await;
        self.persist(&post)?;
        let id = store.commit(post).id.clone();
        drop(store);
        info!(%id, "created post");
        Ok(id)
    }

    async fn update_post(
        &self,
        id: &PostId,
        payload: UpdatePostPayload,
    ) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        let post = store.draft_update(id, payload, Utc::now())?;
        self.persist(&post)?;
        store.commit(post);
        drop(store);
        info!(%id, "updated post");
        Ok(())
    }

    async fn set_visibility(&self, id: &PostId, public: bool) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        let post = store.draft(id, |post| post.public = public)?;
        self.persist(&post)?;
        store.commit(post);
        Ok(())
    }

    async fn set_deleted(&self, id: &PostId, deleted: bool) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        let post = store.draft(id, |post| post.deleted = deleted)?;
        self.persist(&post)?;
        store.commit(post);
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
        let path = self.image_path(&upload.public_id, &upload.format);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| GatewayError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &data).map_err(|source| GatewayError::Io { path, source })?;
        info!(public_id = %upload.public_id, format = %upload.format, "uploaded image");
        Ok(upload)
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), GatewayError> {
        let path = self
            .find_image(public_id)?
            .ok_or_else(|| GatewayError::ImageNotFound(public_id.to_string()))?;
        fs::remove_file(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => GatewayError::ImageNotFound(public_id.to_string()),
            _ => GatewayError::Io { path, source },
        })?;
        info!(%public_id, "deleted image");
        Ok(())
    }

    async fn app_config(&self) -> Result<PublicConfig, GatewayError> {
        Ok(self.config.public())
    }
}
