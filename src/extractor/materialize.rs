use crate::error::Result;
use crate::extractor::source::encode_text;
use crate::extractor::{CodeBlock, CodeBlocks};
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// How header paths are placed under the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPolicy {
    /// Join the path under the root exactly as written in the page.
    #[default]
    Verbatim,
    /// Reject absolute paths and `..` segments so nothing lands outside the root.
    Confined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of writing a set of code blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Materialized {
    pub created: Vec<String>,
    pub errors: Vec<WriteFailure>,
    pub skipped_empty: Vec<String>,
    pub encoding: String,
    pub elapsed: Duration,
}

pub struct FileWriter {
    encoding: &'static Encoding,
    path_policy: PathPolicy,
}

impl FileWriter {
    pub fn new() -> Self {
        Self {
            encoding: UTF_8,
            path_policy: PathPolicy::Verbatim,
        }
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    /// Write every non-empty block under `output_root`.
    ///
    /// Only failing to create `output_root` itself is an error; a block that
    /// cannot be written is recorded in [`Materialized::errors`] and the rest
    /// are still written.
    pub fn materialize(&self, blocks: &CodeBlocks, output_root: &Path) -> Result<Materialized> {
        let start_time = Instant::now();

        if !output_root.exists() {
            fs::create_dir_all(output_root)?;
        }

        let mut created = Vec::new();
        let mut errors = Vec::new();
        let mut skipped_empty = Vec::new();

        for block in blocks {
            if block.is_empty() {
                skipped_empty.push(block.path.clone());
                continue;
            }

            match self.write_block(block, output_root) {
                Ok(_) => {
                    info!("Created file: {}", block.path);
                    created.push(block.path.clone());
                }
                Err(reason) => {
                    error!("Error creating file {}: {}", block.path, reason);
                    errors.push(WriteFailure {
                        path: block.path.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(Materialized {
            created,
            errors,
            skipped_empty,
            encoding: self.encoding.name().to_string(),
            elapsed: start_time.elapsed(),
        })
    }

    fn write_block(&self, block: &CodeBlock, output_root: &Path) -> std::result::Result<PathBuf, String> {
        let dest_path = self.destination(output_root, &block.path)?;

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let bytes = encode_text(&block.content(), self.encoding).ok_or_else(|| {
            format!("content has characters not representable in {}", self.encoding.name())
        })?;

        fs::write(&dest_path, bytes).map_err(|e| e.to_string())?;

        Ok(dest_path)
    }

    fn destination(&self, output_root: &Path, relative: &str) -> std::result::Result<PathBuf, String> {
        let relative_path = Path::new(relative);

        if self.path_policy == PathPolicy::Confined {
            let escapes = relative_path.components().any(|c| {
                matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
            });
            if escapes {
                return Err(format!("path escapes the output directory: {}", relative));
            }
        }

        Ok(output_root.join(relative_path))
    }
}

impl Default for FileWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `blocks` under `output_root` with the reference (verbatim) path policy.
pub fn materialize(
    blocks: &CodeBlocks,
    output_root: &Path,
    encoding: &'static Encoding,
) -> Result<Materialized> {
    FileWriter::new()
        .with_encoding(encoding)
        .materialize(blocks, output_root)
}
