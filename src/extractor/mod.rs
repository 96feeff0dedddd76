pub mod blocks;
pub mod materialize;
pub mod report;
pub mod selectors;
pub mod source;

pub use blocks::{compute_blocks, header_path, parse_document, CodeBlock, CodeBlocks};
pub use materialize::{materialize, FileWriter, Materialized, PathPolicy, WriteFailure};
pub use report::{ExtractionMode, ExtractionReport, FileInfo};
pub use selectors::Selectors;
pub use source::{read_html, resolve_encoding, DecodedSource};

use crate::config::SelectorConfig;
use crate::error::{ExtractorError, Result};
use encoding_rs::Encoding;
use std::path::Path;

/// Result of [`extract_code`]: the mapping itself in preview mode, the
/// written files otherwise.
#[derive(Debug, Clone)]
pub enum ExtractionOutput {
    Preview(CodeBlocks),
    Written(Materialized),
}

/// Read, decode and parse `html_path`, then collect its code blocks.
pub fn load_blocks(
    html_path: &Path,
    selector_config: &SelectorConfig,
    encoding: &'static Encoding,
    on_progress: Option<&dyn Fn(f64)>,
) -> Result<(CodeBlocks, DecodedSource)> {
    let source = read_html(html_path, encoding)?;
    let selectors = Selectors::compile(selector_config)?;
    let document = parse_document(&source.text);

    let blocks = compute_blocks(&document, &selectors, on_progress);
    Ok((blocks, source))
}

/// Preview the code blocks of `html_path` without touching the filesystem.
pub fn preview_code(
    html_path: &Path,
    selector_config: &SelectorConfig,
    encoding: &'static Encoding,
) -> Result<CodeBlocks> {
    load_blocks(html_path, selector_config, encoding, None).map(|(blocks, _)| blocks)
}

/// Extract the code blocks of `html_path`, writing them under `output_root`
/// unless `preview_only` is set.
///
/// Files are written with `encoding`, which is also the first encoding
/// tried when reading the page. `on_progress` gets one value per header and
/// a final `100.0`.
pub fn extract_code(
    html_path: &Path,
    selector_config: &SelectorConfig,
    output_root: Option<&Path>,
    preview_only: bool,
    encoding: &'static Encoding,
    on_progress: Option<&dyn Fn(f64)>,
) -> Result<ExtractionOutput> {
    let output_root = match (preview_only, output_root) {
        (true, _) => None,
        (false, Some(root)) => Some(root),
        (false, None) => {
            return Err(ExtractorError::Config {
                message: "An output directory is required unless previewing".to_string(),
            })
        }
    };

    let (blocks, _) = load_blocks(html_path, selector_config, encoding, on_progress)?;

    let output = match output_root {
        None => ExtractionOutput::Preview(blocks),
        Some(root) => ExtractionOutput::Written(materialize(&blocks, root, encoding)?),
    };

    if let Some(callback) = on_progress {
        callback(100.0);
    }

    Ok(output)
}
