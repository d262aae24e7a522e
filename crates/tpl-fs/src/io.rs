//! Atomic and bounded I/O primitives

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Size ceiling for structured configuration reads.
///
/// A structured file larger than this is refused rather than parsed, to
/// bound memory use against corrupt or hostile trees.
pub const MAX_CONFIG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Write content atomically via write-to-temp-then-rename.
///
/// The temp file lives in the destination directory so the rename never
/// crosses filesystems. An advisory lock guards the temp file while it is
/// being filled.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native = path.to_native();

    if let Some(parent) = native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native.clone(),
    })?;

    fs::rename(&temp_path, &native).map_err(|e| Error::io(&native, e))?;

    Ok(())
}

/// Write text content atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}

/// Read text content, refusing files over `limit` bytes.
pub fn read_text_capped(path: &NormalizedPath, limit: u64) -> Result<String> {
    let native = path.to_native();
    let size = fs::metadata(&native).map_err(|e| Error::io(&native, e))?.len();
    if size > limit {
        return Err(Error::FileTooLarge {
            path: native,
            size,
            limit,
        });
    }
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    let dst_native = dst.to_native();
    if let Some(parent) = dst_native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(src.as_ref(), &dst_native).map_err(|e| Error::io(&dst_native, e))?;
    Ok(())
}

/// List every file under `root`, as sorted root-relative normalized paths.
///
/// Directories themselves are not listed. Symlinks are reported as files and
/// never followed into.
pub fn walk_relative(root: &NormalizedPath) -> Result<Vec<String>> {
    let mut files = Vec::new();
    walk_into(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_into(
    root: &NormalizedPath,
    dir: &NormalizedPath,
    files: &mut Vec<String>,
) -> Result<()> {
    let native = dir.to_native();
    for entry in fs::read_dir(&native).map_err(|e| Error::io(&native, e))? {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        let path = NormalizedPath::new(entry.path());
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            walk_into(root, &path, files)?;
        } else if let Some(rel) = path.relative_to(root) {
            files.push(rel);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join("nested/out.txt"));

        write_text(&path, "payload").unwrap();
        assert_eq!(read_text(&path).unwrap(), "payload");

        // No temp file left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn read_text_capped_refuses_oversized() {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join("big.yaml"));
        write_text(&path, "key: value\n").unwrap();

        let err = read_text_capped(&path, 4).unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { size: 11, limit: 4, .. }));
        assert!(read_text_capped(&path, 1024).is_ok());
    }

    #[test]
    fn walk_relative_lists_nested_files_sorted() {
        let dir = TempDir::new().unwrap();
        let root = NormalizedPath::new(dir.path());
        write_text(&root.join("b.yaml"), "b: 1\n").unwrap();
        write_text(&root.join("sections/a.yaml"), "a: 1\n").unwrap();
        write_text(&root.join("sections/deep/c.json"), "{}").unwrap();

        let files = walk_relative(&root).unwrap();
        assert_eq!(
            files,
            vec!["b.yaml", "sections/a.yaml", "sections/deep/c.json"]
        );
    }
}
