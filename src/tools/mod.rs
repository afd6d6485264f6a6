//! Tools module - page snapshot, action execution and the action registry

pub mod browser;
pub mod registry;

pub use browser::{ActionExecutor, Navigator, Snapshot};
pub use registry::ToolRegistry;
