//! Cell editing
//!
//! - **surface**: the rich-text editing surface seam and a reference
//!   normalizing implementation
//! - **session**: the one-edit-at-a-time state machine and the save decision

pub mod session;
pub mod surface;

pub use session::{persisted_value, EditContext, EditSession, EditorOutput, SavedEdit};
pub use surface::{EditingSurface, NormalizingSurface};
