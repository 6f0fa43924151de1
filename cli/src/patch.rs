#![deny(missing_docs)]

//! # Patch Command
//!
//! Runs the TM16XX fixup over the dependency cache. With no flags this is the
//! pre-build hook: walk `.pio/libdeps` from the project root and fix every
//! `TM16XX.cpp` found.

use clap::builder::NonEmptyStringValueParser;
use std::path::PathBuf;
use tm16xx_patch_core::patcher::{
    BROKEN_EXPRESSION, DEFAULT_SEARCH_ROOT, FIXED_EXPRESSION, TARGET_FILE_NAME,
};
use tm16xx_patch_core::{apply_patch, preview_patch, AppResult, Patch, PatchAction};

/// Arguments for the patch run.
#[derive(clap::Args, Debug, Clone)]
pub struct PatchArgs {
    /// Dependency cache to search (relative to the working directory).
    #[clap(long, default_value = DEFAULT_SEARCH_ROOT)]
    pub root: PathBuf,

    /// Exact name of the file to patch.
    #[clap(long, default_value = TARGET_FILE_NAME, value_parser = NonEmptyStringValueParser::new())]
    pub file_name: String,

    /// Text to replace.
    #[clap(long, default_value = BROKEN_EXPRESSION, value_parser = NonEmptyStringValueParser::new())]
    pub pattern: String,

    /// Text written in its place. Must not contain the pattern.
    #[clap(long, default_value = FIXED_EXPRESSION, value_parser = NonEmptyStringValueParser::new())]
    pub replacement: String,

    /// Report what would change without writing any file.
    #[clap(long)]
    pub dry_run: bool,
}

impl PatchArgs {
    fn patch(&self) -> Patch {
        Patch::new(&self.file_name, &self.pattern, &self.replacement)
    }
}

/// Executes the patch run.
///
/// # Returns
///
/// * The per-file actions, in traversal order.
pub fn execute(args: &PatchArgs) -> AppResult<Vec<PatchAction>> {
    let patch = args.patch();
    if args.dry_run {
        preview_patch(&args.root, &patch)
    } else {
        apply_patch(&args.root, &patch)
    }
}
