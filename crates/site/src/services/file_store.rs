//! Gallery File Store: a flat directory of uploaded image files.
//!
//! Files are addressed by generated names only. Every public method checks
//! the name before touching the filesystem, so a name read back from the
//! database can never escape the directory.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Handle to the gallery upload directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a handle for `root`. The directory is not touched.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Full path of a stored file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `filename` is not a plain, safe file name.
    pub fn path_for(&self, filename: &str) -> io::Result<PathBuf> {
        if is_safe_filename(filename) {
            Ok(self.root.join(filename))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe file name: {filename:?}"),
            ))
        }
    }

    /// Write a new file. Fails with `AlreadyExists` rather than overwrite.
    ///
    /// A partially written file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn write_new(&self, filename: &str, data: &[u8]) -> io::Result<()> {
        let path = self.path_for(filename)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }
        Ok(())
    }

    /// Remove a file. Returns `false` if it was already absent.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than `NotFound`.
    pub async fn remove(&self, filename: &str) -> io::Result<bool> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether a stored file exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unsafe names, or the underlying I/O error.
    pub async fn exists(&self, filename: &str) -> io::Result<bool> {
        let path = self.path_for(filename)?;
        fs::try_exists(&path).await
    }

    /// Names of all regular files in the directory, sorted.
    ///
    /// A missing directory is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn list(&self) -> io::Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Accept only flat names made of ASCII letters, digits, `-`, `_`, and `.`,
/// not starting with a dot.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("1700000000000-000000042.jpg"));
        assert!(is_safe_filename("photo_1.webp"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../secret"));
        assert!(!is_safe_filename("a/b.jpg"));
        assert!(!is_safe_filename("a\\b.jpg"));
        assert!(!is_safe_filename(".hidden"));
        assert!(!is_safe_filename("with space.jpg"));
    }

    #[tokio::test]
    async fn test_write_new_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write_new("a.jpg", b"one").await.unwrap();
        let err = store.write_new("a.jpg", b"two").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let contents = std::fs::read(dir.path().join("a.jpg")).unwrap();
        assert_eq!(contents, b"one");
    }

    #[tokio::test]
    async fn test_remove_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write_new("a.jpg", b"x").await.unwrap();
        assert!(store.remove("a.jpg").await.unwrap());
        assert!(!store.remove("a.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gallery"));

        let err = store.remove("../outside.jpg").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_list_skips_directories_and_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gallery"));
        assert!(store.list().await.unwrap().is_empty());

        store.ensure_dir().await.unwrap();
        store.write_new("b.png", b"x").await.unwrap();
        store.write_new("a.jpg", b"x").await.unwrap();
        std::fs::create_dir(store.root().join("nested")).unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["a.jpg", "b.png"]);
    }
}
