//! Editing state for a single post.
//!
//! [`EditorViewModel`] is the editable record itself. [`EditorSession`] wraps
//! it together with a gateway handle and is the context object form sections
//! share; it discards responses that arrive after a newer operation started.

mod sequence;
pub use sequence::{Outcome, Sequencer, Ticket};

mod session;
pub use session::EditorSession;

mod view_model;
pub use view_model::{CoverImagePolicy, EditorViewModel};
