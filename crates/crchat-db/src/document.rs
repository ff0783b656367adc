//! Whole-document persistence.
//!
//! A [`Document`] is one JSON value stored in a named resource. It is only
//! ever read or replaced as a whole. Every access goes through the document's
//! lock, so a load-mutate-replace done with [`Document::transact`] cannot lose
//! an update to a concurrent writer.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Raw storage for one document.
pub trait Backend: Send + Sync {
    /// Current bytes, or `None` if the resource does not exist yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the resource's bytes.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable name used in logs and errors.
    fn describe(&self) -> String;
}

/// A document stored as a file on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl Backend for FileBackend {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document held in memory. Clones share the same bytes.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    name: String,
    bytes: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_contents(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Snapshot of the stored bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock().ok().and_then(|b| b.clone())
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        let bytes = self
            .bytes
            .lock()
            .map_err(|e| io::Error::other(format!("memory document lock poisoned: {}", e)))?;
        Ok(bytes.clone())
    }

    fn write(&self, new_bytes: &[u8]) -> io::Result<()> {
        let mut bytes = self
            .bytes
            .lock()
            .map_err(|e| io::Error::other(format!("memory document lock poisoned: {}", e)))?;
        *bytes = Some(new_bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

/// Elements of an id-ordered document.
pub trait Sequenced {
    fn sequence_id(&self) -> u64;
}

impl Sequenced for crchat_types::models::Action {
    fn sequence_id(&self) -> u64 {
        self.id
    }
}

impl Sequenced for crchat_types::models::Message {
    fn sequence_id(&self) -> u64 {
        self.id
    }
}

/// If the sequence is non-empty, its last element's id must be `len - 1`.
pub fn check_sequence<T: Sequenced>(resource: &str, items: &[T]) -> Result<()> {
    if let Some(last) = items.last() {
        let expected = (items.len() - 1) as u64;
        if last.sequence_id() != expected {
            return Err(StoreError::Corrupt {
                resource: resource.to_string(),
                reason: format!(
                    "last element has id {} but the document holds {} elements",
                    last.sequence_id(),
                    items.len()
                ),
            });
        }
    }
    Ok(())
}

/// A JSON document with a default used when the resource does not exist.
pub struct Document<T> {
    name: String,
    default: T,
    backend: Mutex<Box<dyn Backend>>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
{
    /// Open the document, writing `default` if the resource is absent.
    pub fn open(backend: impl Backend + 'static, default: T) -> Result<Self> {
        let name = backend.describe();
        let exists = backend.read().map_err(|source| StoreError::Io {
            resource: name.clone(),
            source,
        })?;

        let doc = Self {
            name,
            default,
            backend: Mutex::new(Box::new(backend)),
        };

        if exists.is_some() {
            info!("Document {} already exists", doc.name);
        } else {
            info!("Document {} does not exist, creating default state", doc.name);
            doc.with_backend(|backend| doc.write_locked(backend, &doc.default))?;
        }

        Ok(doc)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, creating it from the default if the resource vanished.
    pub fn load(&self) -> Result<T> {
        self.with_backend(|backend| self.read_locked(backend))
    }

    /// Current value in its serialized form.
    pub fn load_raw(&self) -> Result<String> {
        let value = self.load()?;
        serde_json::to_string(&value).map_err(|source| self.json_error(source))
    }

    /// Overwrite the whole document.
    pub fn replace(&self, value: &T) -> Result<()> {
        self.with_backend(|backend| self.write_locked(backend, value))
    }

    /// Load, let `f` mutate, and persist, all under the document lock.
    ///
    /// Nothing is written if `f` fails or leaves the value unchanged.
    pub fn transact<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        self.with_backend(|backend| {
            let before = self.read_locked(backend)?;
            let mut value = before.clone();
            let out = f(&mut value)?;
            if value != before {
                self.write_locked(backend, &value)?;
            } else {
                debug!("Document {} unchanged, skipping write", self.name);
            }
            Ok(out)
        })
    }

    fn with_backend<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&dyn Backend) -> Result<R>,
    {
        let backend = self
            .backend
            .lock()
            .map_err(|_| StoreError::LockPoisoned(self.name.clone()))?;
        f(&**backend)
    }

    fn read_locked(&self, backend: &dyn Backend) -> Result<T> {
        debug!("Loading document {}", self.name);
        match backend.read().map_err(|source| self.io_error(source))? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| self.json_error(source)),
            None => {
                info!("Document {} is missing, recreating default state", self.name);
                self.write_locked(backend, &self.default)?;
                Ok(self.default.clone())
            }
        }
    }

    fn write_locked(&self, backend: &dyn Backend, value: &T) -> Result<()> {
        debug!("Updating document {}", self.name);
        let bytes = serde_json::to_vec(value).map_err(|source| self.json_error(source))?;
        backend.write(&bytes).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            resource: self.name.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Json {
            resource: self.name.clone(),
            source,
        }
    }
}
