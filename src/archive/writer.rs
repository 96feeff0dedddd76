use crate::archive::{ArchiveMetadata, METADATA_FILE, PREVIEW_FILE};
use crate::config::SelectorConfig;
use crate::error::{ExtractorError, Result};
use crate::extractor::{compute_blocks, parse_document, read_html, CodeBlocks, Selectors};
use chrono::Local;
use dom_query::Document;
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SavedArchive {
    pub directory: PathBuf,
    pub metadata: ArchiveMetadata,
    pub blocks: CodeBlocks,
}

pub struct ArchiveWriter {
    archives_dir: PathBuf,
    selectors: SelectorConfig,
    encoding: &'static Encoding,
}

impl ArchiveWriter {
    pub fn new<P: AsRef<Path>>(archives_dir: P) -> Self {
        Self {
            archives_dir: archives_dir.as_ref().to_path_buf(),
            selectors: SelectorConfig::default(),
            encoding: UTF_8,
        }
    }

    pub fn with_selectors(mut self, selectors: SelectorConfig) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Archive `html_path` as `<archives_dir>/<name>/`.
    ///
    /// Without a name the archive is called `<page stem>_<YYYYmmdd_HHMMSS>`.
    pub fn save(&self, html_path: &Path, archive_name: Option<&str>) -> Result<SavedArchive> {
        let source = read_html(html_path, self.encoding)?;
        let selectors = Selectors::compile(&self.selectors)?;
        let document = parse_document(&source.text);

        let file_name = html_path
            .file_name()
            .ok_or_else(|| ExtractorError::Archive {
                message: format!("Not a file path: {}", html_path.display()),
            })?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let name = match archive_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let stem = html_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "page".to_string());
                format!("{}_{}", stem, timestamp)
            }
        };

        let directory = self.archives_dir.join(&name);
        fs::create_dir_all(&directory)?;
        fs::copy(html_path, directory.join(file_name))?;

        let metadata = ArchiveMetadata {
            original_file: html_path.display().to_string(),
            title: page_title(&document)
                .unwrap_or_else(|| file_name.to_string_lossy().into_owned()),
            date_saved: timestamp,
            file_size: fs::metadata(html_path)?.len(),
            encoding: self.encoding.name().to_lowercase(),
            selectors: self.selectors.clone(),
        };
        fs::write(
            directory.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        let blocks = compute_blocks(&document, &selectors, None);
        fs::write(directory.join(PREVIEW_FILE), render_preview(&blocks))?;

        info!("Created HTML archive at: {}", directory.display());

        Ok(SavedArchive {
            directory,
            metadata,
            blocks,
        })
    }
}

/// Text of `preview.txt` for `blocks`.
pub fn render_preview(blocks: &CodeBlocks) -> String {
    if blocks.is_empty() {
        return "No code files found in HTML.".to_string();
    }

    let mut lines = vec!["Files that will be extracted:".to_string(), String::new()];
    lines.extend(
        blocks
            .iter()
            .map(|block| format!("{} ({} lines)", block.path, block.lines.len())),
    );
    lines.join("\n")
}

fn page_title(document: &Document) -> Option<String> {
    let title = document.select("title");
    if title.is_empty() {
        return None;
    }

    let text = title.text().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
