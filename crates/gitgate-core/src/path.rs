//! Lexical path helpers used by the registry and the path guard.
//!
//! Nothing here touches symlinks: paths are made absolute against the
//! current directory and cleaned of `.` and `..` segments textually.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Name of the metadata entry that marks a working tree.
pub const GIT_DIR: &str = ".git";

/// Make `raw` absolute relative to the current directory and clean it.
pub fn absolutize(raw: impl AsRef<Path>) -> io::Result<PathBuf> {
    let raw = raw.as_ref();
    if raw.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()?.join(raw)
    };
    Ok(clean(&joined))
}

/// Drop `.` segments and fold `..` into the preceding segment.
///
/// `..` never climbs above the root.
pub fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => cleaned.push(prefix.as_os_str()),
            Component::RootDir => cleaned.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            Component::Normal(segment) => cleaned.push(segment),
        }
    }
    cleaned
}

/// True when `path` equals `root` or lies below it, compared segment by
/// segment so `/repo-evil` is not inside `/repo`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Whether `path` itself is a working tree root.
pub fn is_repository_root(path: &Path) -> bool {
    path.join(GIT_DIR).exists()
}

/// Whether `path` is an existing directory that, itself or through one of
/// its ancestors no higher than `root`, carries git metadata.
pub fn has_git_metadata(path: &Path, root: &Path) -> bool {
    path.is_dir()
        && path
            .ancestors()
            .take_while(|ancestor| ancestor.starts_with(root))
            .any(is_repository_root)
}

/// Final path segment, falling back to the whole path for `/`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
