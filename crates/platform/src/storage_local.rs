//! Local filesystem Storage implementation for host builds.
//!
//! `LocalFileStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (host previews and tests).
//! All names are resolved relative to the root provided at construction,
//! mirroring the SD card mount point on the badge.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::storage::Storage;

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// # Example
/// ```ignore
/// use platform::storage_local::LocalFileStorage;
/// use platform::Storage;
/// let mut storage = LocalFileStorage::new("/media/sdcard");
/// let size = storage.file_size("profile.bmp").unwrap();
/// let mut buf = vec![0u8; size];
/// storage.read_file("profile.bmp", &mut buf).unwrap();
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `root`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    /// Create from the `BADGE_ASSETS` environment variable.
    ///
    /// Returns `None` if `BADGE_ASSETS` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("BADGE_ASSETS").ok().map(|p| Self::new(&p))
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;

    fn file_size(&mut self, name: &str) -> Result<usize, Self::Error> {
        let meta = fs::metadata(self.resolve(name)).map_err(LocalStorageError)?;
        usize::try_from(meta.len()).map_err(|_| {
            LocalStorageError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file larger than the address space",
            ))
        })
    }

    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut file = fs::File::open(self.resolve(name)).map_err(LocalStorageError)?;
        let mut filled = 0;
        while let Some(rest) = buf.get_mut(filled..) {
            if rest.is_empty() {
                break;
            }
            let n = file.read(rest).map_err(LocalStorageError)?;
            if n == 0 {
                break;
            }
            filled = filled.saturating_add(n);
        }
        Ok(filled)
    }

    fn exists(&mut self, name: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(name).exists())
    }
}
