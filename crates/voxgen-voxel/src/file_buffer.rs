//! Memory-mapped output files with scoped acquisition.
//!
//! A [`FileBuffer`] owns a freshly created file of a fixed size and a writable
//! mapping over it. The mapping is flushed by [`FileBuffer::finish`]; if the
//! buffer is dropped without finishing (an error path or a panic in the
//! writer), `Drop` still flushes on a best-effort basis before unmapping.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::StorageError;

/// A writable, file-backed byte buffer of fixed length.
pub struct FileBuffer {
    path: PathBuf,
    // `None` for zero-length files, which cannot be mapped.
    map: Option<MmapMut>,
    _file: File,
}

impl FileBuffer {
    /// Create (or truncate) `path`, size it to `len` bytes, and map it.
    pub fn create(path: &Path, len: usize) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;
        file.set_len(len as u64)
            .map_err(|e| StorageError::io(path, e))?;

        let map = if len == 0 {
            None
        } else {
            // SAFETY: the file was just created and truncated by us and is
            // not shared with other writers for the lifetime of the map.
            let map = unsafe { MmapMut::map_mut(&file) }.map_err(|e| StorageError::io(path, e))?;
            Some(map)
        };

        Ok(Self {
            path: path.to_path_buf(),
            map,
            _file: file,
        })
    }

    /// Create a buffer, let `fill` write into it, then flush.
    ///
    /// The mapping is released on every exit path.
    pub fn write_with<F>(path: &Path, len: usize, fill: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut [u8]),
    {
        let mut buffer = Self::create(path, len)?;
        fill(buffer.as_mut_slice());
        buffer.finish()
    }

    /// Convenience wrapper writing `bytes` verbatim.
    pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        Self::write_with(path, bytes.len(), |buf| buf.copy_from_slice(bytes))
    }

    /// The mapped bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.map.as_mut() {
            Some(map) => &mut map[..],
            None => &mut [],
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the mapping to disk and release it.
    pub fn finish(mut self) -> Result<(), StorageError> {
        if let Some(map) = self.map.take() {
            map.flush().map_err(|e| StorageError::io(&self.path, e))?;
        }
        Ok(())
    }
}

impl Drop for FileBuffer {
    fn drop(&mut self) {
        if let Some(map) = self.map.take()
            && let Err(e) = map.flush()
        {
            tracing::warn!("failed to flush {}: {e}", self.path.display());
        }
    }
}
