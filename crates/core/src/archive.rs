//! In-memory zip packaging of export documents
//!
//! The bundle holds one JSON entry per exported project. Entry names
//! combine the sanitized display name with the project's immutable gid, so
//! two projects with identical names never collide. If two documents were
//! ever handed in under the same gid the later entry wins; that is
//! last-write-wins by design, not an error.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::model::ProjectExport;
use crate::paths::sanitize;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("serializing export document failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Archive entry name for one project: `sanitize(display_name)_{gid}.json`.
pub fn entry_name(display_name: &str, gid: &str) -> String {
    format!("{}_{}.json", sanitize(display_name), gid)
}

/// Accumulates export documents into a single deflated zip held in memory.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Serialize `export` and write it as this project's entry.
    pub fn add_project(
        &mut self,
        display_name: &str,
        gid: &str,
        export: &ProjectExport,
    ) -> Result<(), ArchiveError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(entry_name(display_name, gid), options)?;
        self.writer.write_all(&serde_json::to_vec_pretty(export)?)?;
        self.entries += 1;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    /// Finalize the central directory and return the bundle bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
