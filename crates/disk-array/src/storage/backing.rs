//! Backing files for mapped storage.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DiskArrayError, Result};

/// A sized file on disk. The file is removed when this value is dropped,
/// unless it has already been unlinked.
#[derive(Debug)]
pub(crate) struct BackingFile {
    path: PathBuf,
    bytes: u64,
    linked: bool,
}

impl BackingFile {
    /// Creates or truncates the file at `path` and sizes it to `bytes`.
    ///
    /// Returns the open handle alongside so the caller can map it; the handle
    /// may be closed as soon as the mapping exists.
    pub(crate) fn create(path: PathBuf, bytes: u64) -> Result<(Self, File)> {
        let handle = open_options()
            .open(&path)
            .map_err(|source| DiskArrayError::Open {
                path: path.clone(),
                source,
            })?;
        let file = Self {
            path,
            bytes,
            linked: true,
        };
        // Dropping `file` on failure removes what we just created.
        handle
            .set_len(bytes)
            .map_err(|source| DiskArrayError::Size {
                path: file.path.clone(),
                bytes,
                source,
            })?;
        Ok((file, handle))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Removes the directory entry now. Mapped pages stay valid until unmapped.
    pub(crate) fn unlink(&mut self) -> io::Result<()> {
        if !self.linked {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.linked = false;
        Ok(())
    }
}

impl Drop for BackingFile {
    fn drop(&mut self) {
        if let Err(e) = self.unlink() {
            log::warn!(
                "failed to remove backing file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(true).mode(0o666);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sizes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backing");
        let (file, _handle) = BackingFile::create(path.clone(), 4096).unwrap();
        assert_eq!(file.bytes(), 4096);
        assert_eq!(fs::metadata(&path).unwrap().len(), 4096);
    }

    #[test]
    fn create_truncates_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backing");
        fs::write(&path, [0xffu8; 64]).unwrap();

        let (_file, _handle) = BackingFile::create(path.clone(), 16).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backing");
        let (file, handle) = BackingFile::create(path.clone(), 8).unwrap();
        drop(handle);
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn unlink_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backing");
        let (mut file, _handle) = BackingFile::create(path.clone(), 8).unwrap();
        file.unlink().unwrap();
        assert!(!path.exists());
        file.unlink().unwrap();
    }

    #[test]
    fn created_file_is_read_write_for_owner() {
        use std::io::{Read, Seek, SeekFrom, Write};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backing");
        let (_file, mut handle) = BackingFile::create(path.clone(), 4).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o600, 0o600);

        handle.write_all(&[1, 2]).unwrap();
        handle.seek(SeekFrom::Start(0)).unwrap();
        let mut contents = Vec::new();
        handle.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![1, 2, 0, 0]);
    }

    #[test]
    fn open_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("backing");
        let err = BackingFile::create(path.clone(), 8).unwrap_err();
        match err {
            DiskArrayError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected open error, got {other:?}"),
        }
    }
}
