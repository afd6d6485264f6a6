//! Page tools
//!
//! The snapshot serializer and the action executor operating on the UI tree.

mod executor;
mod snapshot;

pub use executor::{
    ActionExecutor, Navigator, HIGHLIGHT_DURATION, HIGHLIGHT_SHADOW, HIGHLIGHT_TRANSITION,
    TRANSITION_RESTORE_DELAY,
};
pub use snapshot::{render_balanced, Snapshot, MAX_DEPTH, MAX_SNAPSHOT_CHARS};
