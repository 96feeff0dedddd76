pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{ArchiveConfig, CliOverrides, Config, OutputConfig, SelectorConfig, UiConfig};
pub use error::{ExtractorError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveInfo, ArchiveMetadata, ArchiveReader, ArchiveSummary, ArchiveWriter, SavedArchive};
pub use extractor::{
    compute_blocks, extract_code, materialize, parse_document, preview_code, CodeBlock,
    CodeBlocks, ExtractionOutput, ExtractionReport, FileWriter, Materialized, PathPolicy,
    Selectors, WriteFailure,
};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use encoding_rs::Encoding;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;

/// Page to extract plus the settings that apply to it.
struct ResolvedInput {
    html_path: PathBuf,
    selectors: SelectorConfig,
    encoding: &'static Encoding,
}

/// Main library interface for HTML code extraction
pub struct CodeExtractor {
    config: Config,
    overrides: CliOverrides,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl CodeExtractor {
    /// Create a new CodeExtractor with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            overrides: CliOverrides::default(),
            output_formatter,
            progress_manager,
        }
    }

    /// Command-line settings that also win over the settings stored in an archive.
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Create CodeExtractor instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
            .with_overrides(cli_args.create_cli_overrides()))
    }

    /// List the code files of a page or archive without writing anything.
    pub async fn preview(&self, input: &Path) -> Result<ExtractionReport> {
        let resolved = self.resolve_input(input)?;
        let spinner = self.progress_manager.create_spinner("Reading HTML");

        let html_path = resolved.html_path.clone();
        let selectors = resolved.selectors.clone();
        let encoding = resolved.encoding;
        let loaded = task::spawn_blocking(move || {
            extractor::load_blocks(&html_path, &selectors, encoding, None)
        })
        .await
        .map_err(join_error)?;
        spinner.finish_and_clear();
        let (blocks, source) = loaded?;

        if source.fell_back {
            self.output_formatter.warning(&format!(
                "Page was not valid {}, read it as {}",
                resolved.encoding.name(),
                source.encoding.name()
            ));
        }
        if blocks.is_empty() {
            self.output_formatter
                .warning("No code files found. Check the selectors against the page's markup.");
        }

        self.output_formatter.print_preview(&resolved.html_path, &blocks);

        Ok(ExtractionReport::for_preview(
            &resolved.html_path,
            &blocks,
            &resolved.selectors,
            source.encoding.name(),
        ))
    }

    /// Extract the code files of a page or archive into the configured output directory.
    ///
    /// Per-file failures end up in the report; only problems that stop the
    /// whole run are errors.
    pub async fn extract(&self, input: &Path) -> Result<ExtractionReport> {
        let start_time = Instant::now();
        let resolved = self.resolve_input(input)?;
        let output_dir = self.config.output_dir();

        self.output_formatter.start_operation(&format!(
            "Extracting code from {}",
            resolved.html_path.display()
        ));
        self.output_formatter
            .debug(&format!("Output directory: {}", output_dir.display()));

        let progress_bar = self.progress_manager.create_extraction_progress();
        let progress_callback = {
            let pb = progress_bar.clone();
            move |percent: f64| ui::progress::update_extraction_progress(&pb, percent)
        };

        let writer = FileWriter::new()
            .with_encoding(resolved.encoding)
            .with_path_policy(self.config.path_policy());
        let html_path = resolved.html_path.clone();
        let selectors = resolved.selectors.clone();
        let encoding = resolved.encoding;
        let destination = output_dir.clone();

        let extracted = task::spawn_blocking(move || -> Result<(CodeBlocks, Materialized)> {
            let (blocks, _) = extractor::load_blocks(
                &html_path,
                &selectors,
                encoding,
                Some(&progress_callback),
            )?;
            let materialized = writer.materialize(&blocks, &destination)?;
            progress_callback(100.0);
            Ok((blocks, materialized))
        })
        .await
        .map_err(join_error)?;

        let (blocks, materialized) = match extracted {
            Ok(extracted) => extracted,
            Err(e) => {
                progress_bar.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &progress_bar,
            &format!("Created {} files", materialized.created.len()),
            start_time.elapsed(),
        );

        if blocks.is_empty() {
            self.output_formatter
                .warning("No code files found. Check the selectors against the page's markup.");
        }

        self.output_formatter
            .print_extraction_summary(&materialized, &output_dir);

        Ok(ExtractionReport::for_extraction(
            &resolved.html_path,
            &output_dir,
            &blocks,
            &materialized,
            &resolved.selectors,
        ))
    }

    /// Save a page as an archive under the configured archives directory.
    pub async fn save_archive(&self, html_path: &Path, name: Option<&str>) -> Result<SavedArchive> {
        let writer = ArchiveWriter::new(self.config.archive_dir())
            .with_selectors(self.config.selectors.clone())
            .with_encoding(self.config.encoding()?);

        self.output_formatter
            .start_operation(&format!("Archiving {}", html_path.display()));

        let html_path = html_path.to_path_buf();
        let name = name.map(str::to_string);
        let saved = task::spawn_blocking(move || writer.save(&html_path, name.as_deref()))
            .await
            .map_err(join_error)??;

        self.output_formatter.print_archive_saved(&saved);
        Ok(saved)
    }

    /// Print and return the archives under the configured archives directory.
    pub fn list_archives(&self) -> Result<Vec<ArchiveSummary>> {
        let archives_dir = self.config.archive_dir();
        let archives = ArchiveReader::new(&archives_dir).list()?;
        self.output_formatter
            .print_archive_list(&archives_dir, &archives);
        Ok(archives)
    }

    fn resolve_input(&self, input: &Path) -> Result<ResolvedInput> {
        let reader = ArchiveReader::new(self.config.archive_dir());

        // A bare archive name refers to the archives directory.
        let archive_dir = if input.exists() {
            input.to_path_buf()
        } else {
            reader.resolve(input)
        };

        if !ArchiveReader::is_archive(&archive_dir) {
            return Ok(ResolvedInput {
                html_path: input.to_path_buf(),
                selectors: self.config.selectors.clone(),
                encoding: self.config.encoding()?,
            });
        }

        let info = reader.info(&archive_dir)?;
        self.output_formatter.print_archive_info(&info);
        let html_path = reader.html_file(&archive_dir)?;

        // The archive's recorded settings apply unless given on the command line.
        let mut archived = self.config.clone();
        archived.selectors = info.metadata.selectors.clone();
        if !info.metadata.encoding.is_empty() {
            archived.output.encoding = info.metadata.encoding.clone();
        }
        archived.merge_with_cli_args(&self.overrides);

        Ok(ResolvedInput {
            html_path,
            selectors: archived.selectors.clone(),
            encoding: archived.encoding()?,
        })
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ExtractorError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn join_error(error: task::JoinError) -> ExtractorError {
    ExtractorError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Extraction task failed: {}", error),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><head><title>Chat</title></head><body>
        <div class="text-sm text-zinc-400 mb-2 font-mono">test.py:</div>
        <table class="syntax-highlight">
            <tr class="line added"><td>print("Hello, World!")</td></tr>
            <tr class="line added"><td>print("This is a test")</td></tr>
        </table>
        <div class="text-sm text-zinc-400 mb-2 font-mono">folder/test2.py:</div>
        <table class="syntax-highlight">
            <tr class="line added"><td>def test_function():</td></tr>
            <tr class="line added"><td>    return "Test"</td></tr>
        </table>
    </body></html>"#;

    fn quiet_extractor(temp_dir: &TempDir) -> CodeExtractor {
        let mut config = Config::default();
        config.output.default_dir = temp_dir.path().join("out");
        config.archive.directory = temp_dir.path().join("archives");
        CodeExtractor::new(config, OutputMode::Plain, 0, true)
    }

    fn write_page(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("page.html");
        fs::write(&path, PAGE).unwrap();
        path
    }

    #[tokio::test]
    async fn test_extract_writes_files() {
        let temp_dir = TempDir::new().unwrap();
        let html = write_page(&temp_dir);
        let extractor = quiet_extractor(&temp_dir);

        let report = extractor.extract(&html).await.unwrap();

        assert_eq!(report.created, vec!["test.py", "folder/test2.py"]);
        assert!(report.errors.is_empty());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("out/folder/test2.py")).unwrap(),
            "def test_function():\nreturn \"Test\""
        );
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let html = write_page(&temp_dir);
        let extractor = quiet_extractor(&temp_dir);

        let report = extractor.preview(&html).await.unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.total_lines(), 4);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = quiet_extractor(&temp_dir);

        let error = extractor
            .extract(&temp_dir.path().join("missing.html"))
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractorError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_archive_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let html = write_page(&temp_dir);
        let extractor = quiet_extractor(&temp_dir);

        let saved = extractor.save_archive(&html, Some("chat")).await.unwrap();
        assert_eq!(saved.metadata.title, "Chat");

        let listed = extractor.list_archives().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "chat");

        let report = extractor.extract(&saved.directory).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert!(temp_dir.path().join("out/test.py").exists());
    }

    #[tokio::test]
    async fn test_archive_selectors_are_used() {
        let temp_dir = TempDir::new().unwrap();
        let html = temp_dir.path().join("custom.html");
        fs::write(
            &html,
            r#"<p class="fname">x.txt</p><table class="code"><tr class="plus"><td>one</td></tr></table>"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.archive.directory = temp_dir.path().join("archives");
        config.output.default_dir = temp_dir.path().join("out");
        config.selectors = SelectorConfig {
            file_path_class: "fname".to_string(),
            code_table_class: "code".to_string(),
            code_line_class: "plus".to_string(),
        };
        let archiver = CodeExtractor::new(config, OutputMode::Plain, 0, true);
        let saved = archiver.save_archive(&html, Some("custom")).await.unwrap();

        // A default-configured extractor still honours the archived selectors.
        let extractor = quiet_extractor(&temp_dir);
        let report = extractor.extract(&saved.directory).await.unwrap();

        assert_eq!(report.created, vec!["x.txt"]);
        assert_eq!(report.selectors.code_line_class, "plus");
    }

    #[tokio::test]
    async fn test_archive_of_latin1_page_writes_same_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let html = temp_dir.path().join("latin.html");
        fs::write(
            &html,
            b"<div class=\"text-sm text-zinc-400 mb-2 font-mono\">cafe.txt</div>\
              <table class=\"syntax-highlight\"><tr class=\"line added\"><td>caf\xe9</td></tr></table>",
        )
        .unwrap();

        let mut config = Config::default();
        config.output.default_dir = temp_dir.path().join("direct");
        config.archive.directory = temp_dir.path().join("archives");
        let direct = CodeExtractor::new(config, OutputMode::Plain, 0, true);
        direct.extract(&html).await.unwrap();
        let saved = direct.save_archive(&html, Some("latin")).await.unwrap();

        let from_archive = quiet_extractor(&temp_dir);
        from_archive.extract(&saved.directory).await.unwrap();

        let direct_bytes = fs::read(temp_dir.path().join("direct/cafe.txt")).unwrap();
        let archived_bytes = fs::read(temp_dir.path().join("out/cafe.txt")).unwrap();
        assert_eq!(direct_bytes, "café".as_bytes());
        assert_eq!(archived_bytes, direct_bytes);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.json");

        CodeExtractor::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        let loaded: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.selectors, SelectorConfig::default());
    }
}
