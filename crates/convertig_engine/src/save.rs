use std::path::PathBuf;

use convertig_logging::{cv_debug, cv_info};

use crate::filename::{available_name, sanitize_filename};
use crate::persist::{AtomicFileWriter, PersistError};

const SAVE_ATTEMPTS: usize = 8;

/// Receives finished artifacts on behalf of the user.
pub trait SaveTarget: Send + Sync {
    fn save(&self, suggested_name: &str, content: &[u8]) -> Result<PathBuf, PersistError>;
}

/// Saves into a directory without overwriting earlier downloads.
pub struct DirectorySaveTarget {
    writer: AtomicFileWriter,
}

impl DirectorySaveTarget {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, suggested_name: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let wanted = sanitize_filename(suggested_name);
        let mut last = None;
        for _ in 0..SAVE_ATTEMPTS {
            let name = available_name(self.writer.dir(), &wanted);
            match self.writer.create(&name, content) {
                Ok(path) => {
                    cv_info!("saved {} bytes to {:?}", content.len(), path);
                    return Ok(path);
                }
                // Another writer took the name between the lookup and the rename.
                Err(PersistError::Exists(path)) => {
                    cv_debug!("{:?} appeared while saving; picking another name", path);
                    last = Some(path);
                }
                Err(err) => return Err(err),
            }
        }
        Err(PersistError::Exists(
            last.unwrap_or_else(|| self.writer.dir().join(&wanted)),
        ))
    }
}
