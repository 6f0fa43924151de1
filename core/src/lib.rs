#![deny(missing_docs)]

//! # TM16XX Patch Core
//!
//! Pre-build fixups for vendored library sources in the PlatformIO dependency cache.

/// Shared error types.
pub mod error;

/// Dependency cache traversal and in-place source patching.
pub mod patcher;

pub use error::{AppError, AppResult};
pub use patcher::{
    apply_patch, find_targets, patch_file, preview_patch, FileState, Patch, PatchAction,
    DEFAULT_SEARCH_ROOT,
};
