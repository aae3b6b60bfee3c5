//! Editing core for a blog content-management console.
//!
//! Posts are edited through an [`EditorSession`], which keeps an
//! [`EditorViewModel`] in step with a backend reached through the
//! [`PostGateway`] trait.

pub mod domain;
pub use domain::{Config, EditablePost, PostId, RemoteDocument, TopicCatalog};

pub mod editor;
pub use editor::{CoverImagePolicy, EditorSession, EditorViewModel, Outcome};

pub mod gateway;
pub use gateway::{FileGateway, GatewayError, MemoryGateway, PostGateway};
