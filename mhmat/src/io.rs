//! File system access for material files
//!
//! Material files are read through the [`FileSystem`] trait so they can come
//! from disk, memory or an archive. Text is decoded lossily: bytes that are not
//! valid UTF-8 are replaced instead of failing the read.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Trait for custom file I/O implementations
pub trait FileSystem: std::fmt::Debug + Send + Sync {
    /// Check if a file exists
    fn exists(&self, path: &str) -> bool;

    /// Read a whole file
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Replace a file's contents, creating it if needed
    ///
    /// Read-only file systems keep the default implementation.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let _ = data;
        Err(Error::io_error(format!(
            "Write not supported for read-only file system: {}",
            path
        )))
    }

    /// Read a file as text, replacing invalid UTF-8
    fn read_to_string(&self, path: &str) -> Result<String> {
        self.read(path).map(decode_lossy)
    }
}

/// Default file system implementation using std::fs
#[derive(Debug, Default)]
pub struct DefaultFileSystem;

impl FileSystem for DefaultFileSystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::file_error(format!("{}: {}", path, e)))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        std::fs::write(path, data).map_err(|e| Error::io_error(format!("{}: {}", path, e)))
    }
}

/// Memory-based file system for testing or embedded resources
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemoryFileSystem {
    /// Create a new memory file system
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Add a file to the memory file system
    pub fn add_file<S: Into<String>, D: Into<Vec<u8>>>(&mut self, path: S, data: D) {
        let data: Vec<u8> = data.into();
        self.files.insert(path.into(), Arc::from(data));
    }

    /// Get the raw contents of a file
    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|data| &data[..])
    }

    /// Get the number of files in the memory file system
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|data| data.to_vec())
            .ok_or_else(|| Error::file_error(format!("File not found: {}", path)))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.files.insert(path.to_string(), Arc::from(data));
        Ok(())
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Directory a material file lives in, used as the base for relative paths
///
/// Returns `None` for bare file names.
pub fn base_location<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.to_string_lossy().into_owned())
}

/// Async helpers for reading and writing material files with tokio
#[cfg(feature = "tokio")]
pub mod async_io {
    use std::path::Path;

    use super::decode_lossy;
    use crate::error::{Error, Result};

    /// Read a file as text, replacing invalid UTF-8
    pub async fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::file_error(format!("{}: {}", path.display(), e)))?;
        Ok(decode_lossy(bytes))
    }

    /// Write text to a file, replacing its contents
    pub async fn write<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, contents.as_bytes())
            .await
            .map_err(|e| Error::io_error(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_file_system() {
        let mut fs = MemoryFileSystem::new();
        assert!(!fs.exists("a.mhmat"));
        fs.add_file("a.mhmat", "name a\n");
        assert!(fs.exists("a.mhmat"));
        assert_eq!(fs.read_to_string("a.mhmat").unwrap(), "name a\n");

        fs.write("b.mhmat", b"name b\n").unwrap();
        assert_eq!(fs.file("b.mhmat"), Some(&b"name b\n"[..]));
        assert_eq!(fs.file_count(), 2);

        assert!(matches!(fs.read("missing"), Err(Error::FileError { .. })));
    }

    #[test]
    fn test_decode_lossy_replaces_invalid_bytes() {
        let text = decode_lossy(vec![b'n', b'a', 0xFF, b'e']);
        assert_eq!(text, "na\u{FFFD}e");
        assert_eq!(decode_lossy(b"plain".to_vec()), "plain");
    }

    #[test]
    fn test_base_location() {
        assert_eq!(
            base_location("/materials/skin.mhmat").as_deref(),
            Some("/materials")
        );
        assert_eq!(base_location("skin.mhmat"), None);
    }
}
