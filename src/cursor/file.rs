use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::paths::files;
use crate::error::CursorError;

/// A single JSON document on disk with fail-soft reads and replace-on-write.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Read the document. Absent: write `T::default()` and return it.
    /// Unreadable or unparseable: log and return `T::default()`.
    pub fn load_or_init<T>(&self) -> T
    where
        T: DeserializeOwned + Serialize + Default,
    {
        match fs::read_to_string(&self.path) {
            Ok(raw) => self.parse_or_default(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let fresh = T::default();
                if let Err(e) = self.store(&fresh) {
                    warn!(path = %self.path.display(), error = %e, "could not initialize cursor file");
                } else {
                    debug!(path = %self.path.display(), "initialized cursor file");
                }
                fresh
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cursor file unreadable, starting empty");
                T::default()
            }
        }
    }

    /// Read without creating anything. `None` when the file does not exist.
    pub fn peek<T>(&self) -> Option<T>
    where
        T: DeserializeOwned + Default,
    {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Some(self.parse_or_default(&raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cursor file unreadable");
                Some(T::default())
            }
        }
    }

    /// Serialize to a sibling temp file, then rename it over the target so a
    /// reader sees either the old or the new document, never half of one.
    pub fn store<T: Serialize>(&self, value: &T) -> Result<(), CursorError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }
        fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))
    }

    fn parse_or_default<T: DeserializeOwned + Default>(&self, raw: &str) -> T {
        match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cursor file corrupt, resetting to empty");
                T::default()
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".");
        name.push(files::TMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> CursorError {
        CursorError::Io { path: self.path.clone(), source }
    }
}
