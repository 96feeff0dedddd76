//! Self-contained page archives.
//!
//! An archive is a directory holding a verbatim copy of a saved page, a
//! `metadata.json` describing how to extract it and a human-readable
//! `preview.txt` listing the files it contains.

pub mod reader;
pub mod writer;

pub use reader::{read_metadata, ArchiveInfo, ArchiveReader, ArchiveSummary};
pub use writer::{render_preview, ArchiveWriter, SavedArchive};

use crate::config::SelectorConfig;
use serde::{Deserialize, Serialize};

pub const METADATA_FILE: &str = "metadata.json";
pub const PREVIEW_FILE: &str = "preview.txt";

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveMetadata {
    pub original_file: String,
    pub title: String,
    /// Local time the archive was written, `YYYYmmdd_HHMMSS`.
    pub date_saved: String,
    pub file_size: u64,
    pub encoding: String,
    pub selectors: SelectorConfig,
}
