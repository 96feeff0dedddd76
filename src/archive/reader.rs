use crate::archive::{ArchiveMetadata, METADATA_FILE, PREVIEW_FILE};
use crate::error::{ExtractorError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub name: String,
    pub path: PathBuf,
    pub metadata: ArchiveMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveInfo {
    pub name: String,
    pub path: PathBuf,
    pub metadata: ArchiveMetadata,
    pub preview: String,
    pub html_file: Option<PathBuf>,
}

pub struct ArchiveReader {
    archives_dir: PathBuf,
}

impl ArchiveReader {
    pub fn new<P: AsRef<Path>>(archives_dir: P) -> Self {
        Self {
            archives_dir: archives_dir.as_ref().to_path_buf(),
        }
    }

    /// Whether `path` is a directory holding archive metadata.
    pub fn is_archive(path: &Path) -> bool {
        path.is_dir() && path.join(METADATA_FILE).is_file()
    }

    /// Archives directly under the archives directory, sorted by name.
    ///
    /// A missing archives directory lists as empty.
    pub fn list(&self) -> Result<Vec<ArchiveSummary>> {
        if !self.archives_dir.is_dir() {
            warn!(
                "Archives directory does not exist: {}",
                self.archives_dir.display()
            );
            return Ok(Vec::new());
        }

        let mut archives = Vec::new();
        let walker = WalkDir::new(&self.archives_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| ExtractorError::Archive {
                message: format!("Failed to scan {}: {}", self.archives_dir.display(), e),
            })?;

            if !Self::is_archive(entry.path()) {
                continue;
            }

            match read_metadata(entry.path()) {
                Ok(metadata) => archives.push(ArchiveSummary {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path().to_path_buf(),
                    metadata,
                }),
                Err(err) => warn!("Skipping archive {}: {}", entry.path().display(), err),
            }
        }

        Ok(archives)
    }

    /// Metadata, preview text and page file of one archive.
    pub fn info(&self, archive_dir: &Path) -> Result<ArchiveInfo> {
        let metadata = read_metadata(archive_dir)?;

        let preview_path = archive_dir.join(PREVIEW_FILE);
        let preview = if preview_path.exists() {
            fs::read_to_string(&preview_path).unwrap_or_else(|e| {
                warn!("Error reading preview file {}: {}", preview_path.display(), e);
                String::new()
            })
        } else {
            String::new()
        };

        Ok(ArchiveInfo {
            name: archive_name(archive_dir),
            path: archive_dir.to_path_buf(),
            metadata,
            preview,
            html_file: find_html_file(archive_dir)?,
        })
    }

    /// The archived page, which must exist for extraction.
    pub fn html_file(&self, archive_dir: &Path) -> Result<PathBuf> {
        find_html_file(archive_dir)?.ok_or_else(|| ExtractorError::Archive {
            message: format!("No HTML files found in archive: {}", archive_dir.display()),
        })
    }

    /// Resolve an archive given either as a path or as a name under the
    /// archives directory.
    pub fn resolve(&self, archive: &Path) -> PathBuf {
        if archive.is_dir() {
            archive.to_path_buf()
        } else {
            self.archives_dir.join(archive)
        }
    }
}

pub fn read_metadata(archive_dir: &Path) -> Result<ArchiveMetadata> {
    if !archive_dir.is_dir() {
        return Err(ExtractorError::Archive {
            message: format!("Archive directory does not exist: {}", archive_dir.display()),
        });
    }

    let metadata_path = archive_dir.join(METADATA_FILE);
    if !metadata_path.exists() {
        return Err(ExtractorError::Archive {
            message: format!("Metadata file not found in archive: {}", metadata_path.display()),
        });
    }

    let content = fs::read_to_string(&metadata_path)?;
    serde_json::from_str(&content).map_err(|e| ExtractorError::Archive {
        message: format!("Error reading metadata file {}: {}", metadata_path.display(), e),
    })
}

fn find_html_file(archive_dir: &Path) -> Result<Option<PathBuf>> {
    for entry in WalkDir::new(archive_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ExtractorError::Archive {
            message: format!("Failed to scan {}: {}", archive_dir.display(), e),
        })?;

        let is_html = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

        if entry.file_type().is_file() && is_html {
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

fn archive_name(archive_dir: &Path) -> String {
    archive_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive_dir.display().to_string())
}
