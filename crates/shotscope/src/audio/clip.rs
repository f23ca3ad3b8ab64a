//! In-memory audio clips
//!
//! A clip owns its bytes behind an `Arc`, so the workflow, history records,
//! and the playback engine can all hold the same buffer without copying it.
//! The buffer is freed exactly once, when the last handle drops.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use symphonia::core::io::MediaSource;

use crate::error::Result;
use crate::format;

/// An audio clip held fully in memory
#[derive(Clone)]
pub struct AudioClip {
    filename: String,
    data: Arc<Vec<u8>>,
}

impl AudioClip {
    /// Create a clip from raw bytes
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data: Arc::new(bytes),
        }
    }

    /// Read a clip from disk, taking the filename from the path
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        Ok(Self::from_bytes(filename, bytes))
    }

    /// Original filename of the clip
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercased filename extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Raw clip bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the clip has no content
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Human-readable size (e.g. "2.40 MB")
    pub fn size_display(&self) -> String {
        format::megabytes(self.len())
    }

    /// A fresh reader over the shared buffer, positioned at the start
    pub fn reader(&self) -> ClipReader {
        ClipReader {
            data: Arc::clone(&self.data),
            pos: 0,
        }
    }

    /// Number of live handles to the underlying buffer
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Seekable reader over a clip's shared buffer
pub struct ClipReader {
    data: Arc<Vec<u8>>,
    pos: u64,
}

impl Read for ClipReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = self.pos.min(self.data.len() as u64) as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ClipReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(n) => self.data.len() as i64 + n,
            SeekFrom::Current(n) => self.pos as i64 + n,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of clip",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

impl MediaSource for ClipReader {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}
