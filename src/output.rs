//! Writing build artifacts and mapping source paths to output paths

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io { path: PathBuf, source: io::Error },
    /// Destination path has no parent folder
    NoParent(PathBuf),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io { path, source } => write!(f, "IO error on {}: {}", path.display(), source),
            OutputError::NoParent(path) => {
                write!(f, "'{}' is not inside a folder", path.display())
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io { source, .. } => Some(source),
            OutputError::NoParent(_) => None,
        }
    }
}

/// Create the folder a destination file goes into.
///
/// Creating a folder that already exists is not an error. A path without a
/// parent component is rejected.
pub fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Err(OutputError::NoParent(path.to_path_buf())),
    };

    fs::create_dir_all(parent).map_err(|source| OutputError::Io { path: parent.to_path_buf(), source })
}

/// Write bytes to a destination, creating parent folders and replacing any
/// existing file.
pub fn write_artifact(dest: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    ensure_parent_dir(dest)?;
    fs::write(dest, bytes).map_err(|source| OutputError::Io { path: dest.to_path_buf(), source })
}

/// Copy a file byte-for-byte, creating parent folders and replacing any
/// existing file.
pub fn copy_artifact(src: &Path, dest: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(dest)?;
    fs::copy(src, dest)
        .map(|_| ())
        .map_err(|source| OutputError::Io { path: dest.to_path_buf(), source })
}

/// Replace the extension of a `/`-separated relative path.
///
/// Only the last segment is considered, so dots in folder names are left
/// alone. A file without an extension gets one appended.
pub fn swap_extension(relative: &str, ext: &str) -> String {
    let (dir, file) = match relative.rfind('/') {
        Some(i) => relative.split_at(i + 1),
        None => ("", relative),
    };

    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };

    format!("{}{}.{}", dir, stem, ext)
}

/// Extension of a `/`-separated relative path, without the dot.
pub fn extension(relative: &str) -> Option<&str> {
    let file = relative.rsplit('/').next().unwrap_or(relative);
    match file.rfind('.') {
        Some(i) if i > 0 && i + 1 < file.len() => Some(&file[i + 1..]),
        _ => None,
    }
}

/// File name of a `/`-separated relative path with the extension stripped.
pub fn file_stem(relative: &str) -> &str {
    let file = relative.rsplit('/').next().unwrap_or(relative);
    match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    }
}

/// Path of `path` relative to `root`, with `/` separators.
///
/// Returns `None` when `path` is not under `root` or is `root` itself.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_swap_extension() {
        assert_eq!(swap_extension("gfx/interface/icon.png", "dds"), "gfx/interface/icon.dds");
        assert_eq!(swap_extension("thumbnail.tga", "png"), "thumbnail.png");
        assert_eq!(swap_extension("gfx/v1.2/icon", "dds"), "gfx/v1.2/icon.dds");
        assert_eq!(swap_extension("a.b.png", "dds"), "a.b.dds");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("gfx/icon.png"), Some("png"));
        assert_eq!(extension("gfx/icon.PNG"), Some("PNG"));
        assert_eq!(extension("common/README"), None);
        assert_eq!(extension("gfx.d/README"), None);
        assert_eq!(extension(".gitignore"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("thumbnail.png"), "thumbnail");
        assert_eq!(file_stem("gfx/thumbnail.svg"), "thumbnail");
        assert_eq!(file_stem("gfx/README"), "README");
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/mods/MyMod");
        assert_eq!(
            relative_path(root, Path::new("/mods/MyMod/gfx/flags/USA.png")),
            Some("gfx/flags/USA.png".to_string())
        );
        assert_eq!(relative_path(root, Path::new("/mods/MyMod")), None);
        assert_eq!(relative_path(root, Path::new("/elsewhere/file.txt")), None);
    }

    #[test]
    fn test_ensure_parent_dir_idempotent() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b/c.txt");
        ensure_parent_dir(&dest).unwrap();
        ensure_parent_dir(&dest).unwrap();
        assert!(temp.path().join("a/b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_without_folder() {
        let result = ensure_parent_dir(Path::new("lonely.txt"));
        assert!(matches!(result, Err(OutputError::NoParent(_))));
    }

    #[test]
    fn test_write_artifact_overwrites() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out/file.txt");
        write_artifact(&dest, b"first").unwrap();
        write_artifact(&dest, b"second").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"second");
    }

    #[test]
    fn test_copy_artifact() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        fs::write(&src, b"payload").unwrap();

        let dest = temp.path().join("nested/dir/dest.txt");
        copy_artifact(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }
}
