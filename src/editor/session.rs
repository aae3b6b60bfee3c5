use std::{fmt, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{CoverImagePolicy, EditorViewModel, Outcome, Sequencer, Ticket};
use crate::{
    PostGateway,
    domain::{
        CoverImageRef, CreatePostPayload, EditablePost, ImageFolder, PostId, RemoteDocument,
        UpdatePostPayload,
    },
    gateway::GatewayError,
};

/// The shared editing context for one post.
///
/// Cloning a session yields another handle to the same state. Operations
/// that replace the state (`open`, `hydrate`, `reset`, `save`) are sequenced:
/// if a newer one starts while a remote call is outstanding, the older
/// result is discarded and reported as [`Outcome::Stale`].
///
/// Cover images detached from the post are only deleted from the image host
/// once a save that no longer references them has succeeded.
#[derive(Clone)]
pub struct EditorSession {
    gateway: Arc<dyn PostGateway>,
    state: Arc<RwLock<State>>,
    sequencer: Arc<Sequencer>,
}

enum PendingSave {
    Update(PostId, UpdatePostPayload),
    Create(CreatePostPayload),
}

#[derive(Debug)]
struct State {
    model: EditorViewModel,
    post_id: Option<PostId>,
    /// Public ids of hosted images the post no longer references.
    detached_images: Vec<String>,
    /// Bumped whenever a different post replaces the current one.
    generation: u64,
}

impl State {
    fn load(&mut self, document: &RemoteDocument, id: Option<PostId>) {
        self.model.hydrate(document);
        self.post_id = id;
        self.detached_images.clear();
        self.generation += 1;
    }

    fn clear(&mut self) {
        self.model.reset();
        self.post_id = None;
        self.detached_images.clear();
        self.generation += 1;
    }

    fn detach(&mut self, cover: CoverImageRef) {
        if !self.detached_images.contains(&cover.public_id) {
            self.detached_images.push(cover.public_id);
        }
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.state)
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Create a session holding a fresh post.
    #[must_use]
    pub fn new(gateway: Arc<dyn PostGateway>, cover_policy: CoverImagePolicy) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(State {
                model: EditorViewModel::new(cover_policy),
                post_id: None,
                detached_images: Vec::new(),
                generation: 0,
            })),
            sequencer: Arc::new(Sequencer::new()),
        }
    }

    /// The gateway this session talks to.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<dyn PostGateway> {
        &self.gateway
    }

    /// A copy of the current fields.
    pub async fn snapshot(&self) -> EditablePost {
        self.state.read().await.model.post().clone()
    }

    /// Id of the post being edited. `None` for a post not yet saved.
    pub async fn post_id(&self) -> Option<PostId> {
        self.state.read().await.post_id.clone()
    }

    /// Apply a form-section edit to the current fields.
    pub async fn edit<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut EditablePost) -> R + Send,
    {
        f(self.state.write().await.model.post_mut())
    }

    /// Load a post by id from its full record.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the fetch fails. The state is unchanged.
    #[instrument(level = "debug", skip(self))]
    pub async fn open(&self, id: &PostId) -> Result<Outcome<()>, GatewayError> {
        let ticket = self.sequencer.issue();
        let document = self.gateway.fetch_post(id).await?;
        Ok(self
            .apply(ticket, &RemoteDocument::from(document), Some(id.clone()))
            .await)
    }

    /// Load a post by id from its listing record.
    ///
    /// Visibility, body, license and related posts keep their current values.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the fetch fails. The state is unchanged.
    #[instrument(level = "debug", skip(self))]
    pub async fn open_summary(
        &self,
        id: &PostId,
        private: bool,
    ) -> Result<Outcome<()>, GatewayError> {
        let ticket = self.sequencer.issue();
        let document = self.gateway.fetch_metadata(id, private).await?;
        Ok(self
            .apply(ticket, &RemoteDocument::from(document), Some(id.clone()))
            .await)
    }

    /// Hydrate from a document obtained elsewhere.
    ///
    /// The session adopts the document's id if it is a valid post id.
    #[instrument(level = "debug", skip_all, fields(id = %document.id()))]
    pub async fn hydrate(&self, document: &RemoteDocument) -> Outcome<()> {
        let ticket = self.sequencer.issue();
        let id = PostId::try_from(document.id().to_string()).ok();
        self.apply(ticket, document, id).await
    }

    async fn apply(
        &self,
        ticket: Ticket,
        document: &RemoteDocument,
        id: Option<PostId>,
    ) -> Outcome<()> {
        let mut state = self.state.write().await;
        if !self.sequencer.is_current(ticket) {
            debug!(id = %document.id(), "discarding stale document");
            return Outcome::Stale;
        }
        state.load(document, id);
        Outcome::Applied(())
    }

    /// Start over with a fresh post, discarding any outstanding load.
    ///
    /// Cover images detached since the last save stay on the image host.
    #[instrument(level = "debug", skip(self))]
    pub async fn reset(&self) {
        let _superseding = self.sequencer.issue();
        self.state.write().await.clear();
    }

    /// Save the current fields.
    ///
    /// A post that was opened is updated in place; otherwise a new post is
    /// created for `author_id` and the session adopts its id. Returns the id
    /// of the saved post.
    ///
    /// Once the save is applied, cover images the post no longer references
    /// are deleted from the image host. A deletion that fails is logged and
    /// retried on the next save.
    ///
    /// If a newer operation started while the save was in flight the remote
    /// write still happened, but the session does not adopt the new id.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the save fails. Detached images are kept.
    #[instrument(level = "debug", skip(self))]
    pub async fn save(&self, author_id: &str) -> Result<Outcome<PostId>, GatewayError> {
        let ticket = self.sequencer.issue();

        let (pending, detached) = {
            let state = self.state.read().await;
            let pending = state.post_id.as_ref().map_or_else(
                || PendingSave::Create(state.model.create_payload(author_id)),
                |id| PendingSave::Update(id.clone(), state.model.update_payload()),
            );
            let current = state.model.post().cover_image.as_ref();
            let detached: Vec<String> = state
                .detached_images
                .iter()
                .filter(|public_id| current.is_none_or(|cover| &cover.public_id != *public_id))
                .cloned()
                .collect();
            (pending, detached)
        };

        let id = match pending {
            PendingSave::Update(id, payload) => {
                self.gateway.update_post(&id, payload).await?;
                info!(%id, "saved post");
                id
            }
            PendingSave::Create(payload) => {
                let id = self.gateway.create_post(payload).await?;
                info!(%id, "created post");
                id
            }
        };

        {
            let mut state = self.state.write().await;
            if !self.sequencer.is_current(ticket) {
                debug!(%id, "discarding stale save result");
                return Ok(Outcome::Stale);
            }
            state.post_id = Some(id.clone());
            state
                .detached_images
                .retain(|public_id| !detached.contains(public_id));
        }

        let mut failed = Vec::new();
        for public_id in detached {
            match self.gateway.delete_image(&public_id).await {
                Ok(()) => info!(%public_id, "deleted detached image"),
                Err(error) => {
                    warn!(%public_id, %error, "failed to delete detached image");
                    failed.push(public_id);
                }
            }
        }
        if !failed.is_empty() {
            self.state.write().await.detached_images.extend(failed);
        }

        Ok(Outcome::Applied(id))
    }

    /// Upload a new cover image and make it current.
    ///
    /// The previous cover image is detached and deleted from the image host
    /// by the next successful [`save`](Self::save).
    ///
    /// If another post was loaded, or the session was reset, while the upload
    /// was in flight, the uploaded image is deleted again and the call reports
    /// [`Outcome::Stale`]. Saves and edits in the meantime do not affect it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the upload fails, or if a stale upload
    /// cannot be deleted. A failed upload leaves the current cover image
    /// untouched.
    #[instrument(level = "debug", skip(self, data), fields(bytes = data.len()))]
    pub async fn replace_cover_image(
        &self,
        data: Vec<u8>,
        ref_name: String,
        ref_url: String,
    ) -> Result<Outcome<CoverImageRef>, GatewayError> {
        let generation = self.state.read().await.generation;
        let upload = self.gateway.upload_image(ImageFolder::Cover, data).await?;
        let cover = CoverImageRef {
            asset_id: upload.asset_id,
            public_id: upload.public_id,
            ref_name,
            ref_url,
        };

        let current = {
            let mut state = self.state.write().await;
            let current = state.generation == generation;
            if current {
                if let Some(previous) = state.model.post_mut().set_cover_image(cover.clone()) {
                    state.detach(previous);
                }
            }
            current
        };
        if current {
            info!(public_id = %cover.public_id, "replaced cover image");
            return Ok(Outcome::Applied(cover));
        }

        debug!(public_id = %cover.public_id, "discarding stale cover upload");
        self.gateway.delete_image(&cover.public_id).await?;
        Ok(Outcome::Stale)
    }

    /// Remove the cover image.
    ///
    /// Returns the removed image, or `None` if there was none. The image is
    /// deleted from the image host by the next successful
    /// [`save`](Self::save).
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_cover_image(&self) -> Option<CoverImageRef> {
        let mut state = self.state.write().await;
        let previous = state.model.post_mut().clear_cover_image()?;
        state.detach(previous.clone());
        drop(state);
        info!(public_id = %previous.public_id, "removed cover image");
        Some(previous)
    }
}
