use crate::config::SelectorConfig;
use crate::error::Result;
use crate::extractor::{CodeBlocks, Materialized, WriteFailure};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    Preview,
    Extract,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub lines: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub source: String,
    pub mode: ExtractionMode,
    pub output_directory: Option<String>,
    pub encoding: String,
    pub selectors: SelectorConfig,
    pub files: Vec<FileInfo>,
    pub created: Vec<String>,
    pub errors: Vec<WriteFailure>,
    pub empty_blocks: Vec<String>,
    pub extraction_time: DateTime<Utc>,
    pub duration: Duration,
}

impl ExtractionReport {
    pub fn for_preview(
        source: &Path,
        blocks: &CodeBlocks,
        selectors: &SelectorConfig,
        encoding: &str,
    ) -> Self {
        Self {
            source: source.display().to_string(),
            mode: ExtractionMode::Preview,
            output_directory: None,
            encoding: encoding.to_string(),
            selectors: selectors.clone(),
            files: file_infos(blocks),
            created: Vec::new(),
            errors: Vec::new(),
            empty_blocks: blocks.empty_paths(),
            extraction_time: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn for_extraction(
        source: &Path,
        output_directory: &Path,
        blocks: &CodeBlocks,
        materialized: &Materialized,
        selectors: &SelectorConfig,
    ) -> Self {
        Self {
            source: source.display().to_string(),
            mode: ExtractionMode::Extract,
            output_directory: Some(output_directory.display().to_string()),
            encoding: materialized.encoding.clone(),
            selectors: selectors.clone(),
            files: file_infos(blocks),
            created: materialized.created.clone(),
            errors: materialized.errors.clone(),
            empty_blocks: materialized.skipped_empty.clone(),
            extraction_time: Utc::now(),
            duration: materialized.elapsed,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.lines).sum()
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json_content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json_content)?;
        Ok(())
    }

    pub fn render_text(&self) -> String {
        let mut text = String::new();

        let _ = writeln!(text, "HTML Code Extraction Report");
        let _ = writeln!(text, "===========================");
        let _ = writeln!(text);
        let _ = writeln!(text, "Source: {}", self.source);
        if let Some(ref output) = self.output_directory {
            let _ = writeln!(text, "Output directory: {}", output);
        }
        let _ = writeln!(text, "Encoding: {}", self.encoding);
        let _ = writeln!(
            text,
            "Extracted at: {}",
            self.extraction_time.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(text);

        let _ = writeln!(text, "Selectors used:");
        let _ = writeln!(text, "  File path: {}", self.selectors.file_path_class);
        let _ = writeln!(text, "  Code table: {}", self.selectors.code_table_class);
        let _ = writeln!(text, "  Code line: {}", self.selectors.code_line_class);
        let _ = writeln!(text);

        let _ = writeln!(text, "Files found: {} ({} lines)", self.files.len(), self.total_lines());
        for file in &self.files {
            let _ = writeln!(text, "  {} ({} lines)", file.path, file.lines);
        }

        if self.mode == ExtractionMode::Extract {
            let _ = writeln!(text);
            let _ = writeln!(text, "Files created: {}", self.created.len());
        }

        if !self.empty_blocks.is_empty() {
            let _ = writeln!(text);
            let _ = writeln!(text, "Headers without code lines:");
            for path in &self.empty_blocks {
                let _ = writeln!(text, "  - {}", path);
            }
        }

        if !self.errors.is_empty() {
            let _ = writeln!(text);
            let _ = writeln!(text, "Errors encountered:");
            for failure in &self.errors {
                let _ = writeln!(text, "  - {}: {}", failure.path, failure.reason);
            }
        }

        text
    }
}

fn file_infos(blocks: &CodeBlocks) -> Vec<FileInfo> {
    blocks
        .iter()
        .map(|block| FileInfo {
            path: block.path.clone(),
            lines: block.lines.len(),
            bytes: block.content().len(),
        })
        .collect()
}
