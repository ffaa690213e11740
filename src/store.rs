use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// I/O faults that are fatal for the whole run.
///
/// A missing file is deliberately *not* represented here: [`read`] reports
/// absence through `Ok(None)` so the runner can skip that target and keep
/// going, while permission, disk, and encoding failures propagate as errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file is not valid UTF-8: {path}")]
    Utf8 { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a file into an owned text buffer.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) if source.kind() == std::io::ErrorKind::InvalidData => Err(StoreError::Utf8 {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Overwrite a file with the buffer's exact contents.
///
/// Atomic: tempfile in the same directory + fsync + rename, so a crash leaves
/// either the old file or the new one, never a torn write. No backup is kept
/// and no newline normalization happens beyond what the buffer carries.
pub fn write(path: &Path, contents: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().ok_or_else(|| {
        io_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(contents.as_bytes()).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = read(&dir.path().join("no-such-file.h")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn read_reports_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let result = read(&path);
        assert!(matches!(result, Err(StoreError::Utf8 { .. })));
    }

    #[test]
    fn write_replaces_contents_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modbus.c");
        fs::write(&path, "old contents\n").unwrap();

        write(&path, "new contents, no trailing newline").unwrap();

        let roundtrip = read(&path).unwrap().unwrap();
        assert_eq!(roundtrip, "new contents, no trailing newline");
    }
}
