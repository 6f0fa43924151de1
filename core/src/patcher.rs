#![deny(missing_docs)]

//! # Source Patching
//!
//! Finds vendored copies of the TM16XX driver inside the PlatformIO dependency
//! cache and rewrites the `min(7, intensity)` call that fails template deduction
//! on ESP32-S3 (`int` vs `byte`).
//!
//! Patching is idempotent: a file is only written when the broken expression is
//! still present, so a second run reports "already patched" and leaves the file
//! (and its mtime) untouched.

use crate::error::{AppError, AppResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Dependency cache directory, relative to the project root.
pub const DEFAULT_SEARCH_ROOT: &str = ".pio/libdeps";

/// File name of the vendored driver source.
pub const TARGET_FILE_NAME: &str = "TM16XX.cpp";

/// Expression that fails to compile.
pub const BROKEN_EXPRESSION: &str = "min(7, intensity)";

/// Expression it is rewritten to.
pub const FIXED_EXPRESSION: &str = "min((byte)7, intensity)";

/// A single-file textual substitution.
///
/// `pattern` and `replacement` must be non-empty, and `replacement` must not
/// contain `pattern`, otherwise repeated runs are not idempotent. See
/// [`Patch::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Exact file name to look for.
    pub target_file_name: String,
    /// Substring to replace.
    pub pattern: String,
    /// Substring written in its place.
    pub replacement: String,
}

impl Default for Patch {
    fn default() -> Self {
        Self::new(TARGET_FILE_NAME, BROKEN_EXPRESSION, FIXED_EXPRESSION)
    }
}

/// How a file's contents relate to a [`Patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// The pattern is present.
    Unpatched,
    /// The pattern is gone and the replacement is present.
    Patched,
    /// Neither is present; the upstream source probably changed.
    Unrecognized,
}

impl Patch {
    /// Creates a patch for `target_file_name`.
    pub fn new(
        target_file_name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            target_file_name: target_file_name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Rejects patches that could never settle into an "already patched" state.
    pub fn validate(&self) -> AppResult<()> {
        if self.target_file_name.is_empty() || self.pattern.is_empty() {
            return Err(AppError::InvalidPatch(
                "target file name and pattern must be non-empty".into(),
            ));
        }
        if self.replacement.contains(&self.pattern) {
            return Err(AppError::InvalidPatch(format!(
                "replacement \"{}\" contains pattern \"{}\"",
                self.replacement, self.pattern
            )));
        }
        Ok(())
    }

    /// Returns true if the final component of `path` is exactly the target file name.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name == self.target_file_name.as_str())
    }

    /// Classifies `contents`.
    pub fn inspect(&self, contents: &str) -> FileState {
        if contents.contains(&self.pattern) {
            FileState::Unpatched
        } else if contents.contains(&self.replacement) {
            FileState::Patched
        } else {
            FileState::Unrecognized
        }
    }

    /// Warning for a target that holds neither the pattern nor the replacement.
    pub fn mismatch_warning(&self, path: &Path, contents: &str) -> Option<String> {
        (self.inspect(contents) == FileState::Unrecognized).then(|| {
            format!(
                "[PATCH] Warning: {} contains neither \"{}\" nor \"{}\"; upstream source may have changed",
                path.display(),
                self.pattern,
                self.replacement
            )
        })
    }

    /// Replaces every occurrence of the pattern.
    ///
    /// Returns `None` when there is nothing to replace.
    pub fn apply_to(&self, contents: &str) -> Option<String> {
        if contents.contains(&self.pattern) {
            Some(contents.replace(&self.pattern, &self.replacement))
        } else {
            None
        }
    }
}

/// Outcome for one matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchAction {
    /// The pattern was replaced and the file rewritten.
    Patched(PathBuf),
    /// The pattern was present but the run was a dry run.
    WouldPatch(PathBuf),
    /// The pattern was absent; nothing was written.
    AlreadyPatched(PathBuf),
}

impl PatchAction {
    /// The file this action refers to.
    pub fn path(&self) -> &Path {
        match self {
            PatchAction::Patched(p)
            | PatchAction::WouldPatch(p)
            | PatchAction::AlreadyPatched(p) => p,
        }
    }
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchAction::Patched(p) => {
                write!(f, "[PATCH] Fixed min() type mismatch in {}", p.display())
            }
            PatchAction::WouldPatch(p) => {
                write!(f, "[PATCH] Would fix min() type mismatch in {}", p.display())
            }
            PatchAction::AlreadyPatched(p) => write!(f, "[PATCH] {} already patched", p.display()),
        }
    }
}

/// Lists every regular file under `search_root` named like the patch target.
///
/// Entries are visited sorted by file name so the order is stable. A missing
/// root yields an empty list: the dependency may simply not be fetched yet.
///
/// Symlinks are not followed, so a symlink named like the target is skipped
/// rather than patched through.
///
/// Directories that cannot be listed are skipped with a warning. Only an error
/// on an entry named like the target is fatal.
pub fn find_targets(search_root: &Path, patch: &Patch) -> AppResult<Vec<PathBuf>> {
    if !search_root.exists() {
        return Ok(Vec::new());
    }

    let mut targets = Vec::new();
    for entry in WalkDir::new(search_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.path().is_some_and(|p| patch.matches(p)) => {
                return Err(err.into());
            }
            Err(err) => {
                eprintln!("[PATCH] Warning: skipping {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() && patch.matches(entry.path()) {
            targets.push(entry.into_path());
        }
    }

    Ok(targets)
}

/// Reads `path`, and rewrites it if the pattern is present.
///
/// With `dry_run` set the file is never written.
pub fn patch_file(path: &Path, patch: &Patch, dry_run: bool) -> AppResult<PatchAction> {
    let content = fs::read_to_string(path).map_err(AppError::file("read", path))?;

    match patch.apply_to(&content) {
        Some(_) if dry_run => Ok(PatchAction::WouldPatch(path.to_path_buf())),
        Some(new_content) => {
            fs::write(path, new_content).map_err(AppError::file("write", path))?;
            Ok(PatchAction::Patched(path.to_path_buf()))
        }
        None => {
            if let Some(warning) = patch.mismatch_warning(path, &content) {
                eprintln!("{}", warning);
            }
            Ok(PatchAction::AlreadyPatched(path.to_path_buf()))
        }
    }
}

/// Patches every target file under `search_root` and prints one status line per file.
///
/// # Arguments
///
/// * `search_root` - Directory to walk (usually [`DEFAULT_SEARCH_ROOT`]).
/// * `patch` - What to look for and what to write.
///
/// # Returns
///
/// * The actions taken, in traversal order. An invalid patch or the first IO
///   failure on a target file aborts the run.
pub fn apply_patch(search_root: &Path, patch: &Patch) -> AppResult<Vec<PatchAction>> {
    run(search_root, patch, false)
}

/// Like [`apply_patch`], but reports what would change without writing.
pub fn preview_patch(search_root: &Path, patch: &Patch) -> AppResult<Vec<PatchAction>> {
    run(search_root, patch, true)
}

fn run(search_root: &Path, patch: &Patch, dry_run: bool) -> AppResult<Vec<PatchAction>> {
    patch.validate()?;

    let mut actions = Vec::new();
    for path in find_targets(search_root, patch)? {
        let action = patch_file(&path, patch, dry_run)?;
        println!("{}", action);
        actions.push(action);
    }
    Ok(actions)
}
