//! Local spool for converted artifacts.
//!
//! Every [`ContentHandle`] handed to the core points at a temp file owned by
//! the vault. The file lives until the handle is released or the vault is
//! dropped.
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use convertig_core::ContentHandle;
use convertig_logging::{cv_debug, cv_warn};
use tempfile::{NamedTempFile, TempDir};

use crate::persist::{ensure_output_dir, PersistError};

enum Root {
    Owned(TempDir),
    Shared(PathBuf),
}

pub struct ArtifactVault {
    root: Root,
    held: Mutex<HashMap<PathBuf, NamedTempFile>>,
}

impl ArtifactVault {
    /// Vault in a private temp directory removed on drop.
    pub fn temporary() -> Result<Self, PersistError> {
        let dir = tempfile::Builder::new().prefix("convertig-vault-").tempdir()?;
        Ok(Self::with_root(Root::Owned(dir)))
    }

    /// Vault spooling into an existing or creatable directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        ensure_output_dir(&dir)?;
        Ok(Self::with_root(Root::Shared(dir)))
    }

    fn with_root(root: Root) -> Self {
        Self {
            root,
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        match &self.root {
            Root::Owned(dir) => dir.path(),
            Root::Shared(dir) => dir,
        }
    }

    pub fn store(
        &self,
        content: &[u8],
        content_type: Option<String>,
    ) -> Result<ContentHandle, PersistError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("artifact-")
            .tempfile_in(self.dir())?;
        tmp.write_all(content)?;
        tmp.flush()?;

        let handle = ContentHandle {
            path: tmp.path().to_path_buf(),
            byte_len: content.len() as u64,
            content_type,
        };
        self.lock().insert(handle.path.clone(), tmp);
        cv_debug!("vault holds {:?} ({} bytes)", handle.path, handle.byte_len);
        Ok(handle)
    }

    pub fn read(&self, handle: &ContentHandle) -> Result<Vec<u8>, PersistError> {
        if !self.lock().contains_key(&handle.path) {
            return Err(PersistError::Released(handle.path.clone()));
        }
        Ok(fs::read(&handle.path)?)
    }

    /// Deletes the spooled file. Unknown handles are ignored.
    pub fn release(&self, handle: &ContentHandle) {
        let Some(file) = self.lock().remove(&handle.path) else {
            cv_warn!("release of unknown content {:?}", handle.path);
            return;
        };
        if let Err(err) = file.close() {
            cv_warn!("failed to delete {:?}: {}", handle.path, err);
        }
    }

    pub fn is_held(&self, handle: &ContentHandle) -> bool {
        self.lock().contains_key(&handle.path)
    }

    pub fn held_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, NamedTempFile>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_content_reads_back_until_released() {
        let vault = ArtifactVault::temporary().unwrap();
        let handle = vault.store(b"GIF89a", Some("image/gif".into())).unwrap();

        assert_eq!(handle.byte_len, 6);
        assert!(handle.path.starts_with(vault.dir()));
        assert_eq!(vault.read(&handle).unwrap(), b"GIF89a");

        vault.release(&handle);
        assert!(!handle.path.exists());
        assert!(matches!(vault.read(&handle), Err(PersistError::Released(_))));
        assert_eq!(vault.held_count(), 0);
    }

    #[test]
    fn shared_directory_is_created() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("spool");
        let vault = ArtifactVault::in_dir(&dir).unwrap();
        let handle = vault.store(b"x", None).unwrap();
        assert!(handle.path.starts_with(&dir));
        assert!(vault.is_held(&handle));
    }
}
