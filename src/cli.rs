use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "html-code-extractor.json";

#[derive(Parser, Debug)]
#[command(name = "html-code-extractor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract code files from saved HTML pages")]
#[command(
    long_about = "HTML Code Extractor finds file-path headers in a saved HTML page, collects the \
                       added lines of the code table following each header and writes them out \
                       as files under an output directory."
)]
#[command(after_help = "EXAMPLES:\n  \
    html-code-extractor chat.html -o ./project\n  \
    html-code-extractor chat.html --preview\n  \
    html-code-extractor chat.html --code-line-class 'diff-add' --encoding windows-1252\n  \
    html-code-extractor chat.html --save-archive my-project\n  \
    html-code-extractor ~/Desktop/HTML-ARCHIVES/my-project -o ./project\n  \
    html-code-extractor --list-archives")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Saved HTML page, or an archive directory created with --save-archive
    #[arg(required_unless_present_any = ["list_archives", "generate_config"])]
    pub input: Option<PathBuf>,

    /// Directory the extracted files are written to
    #[arg(short, long, help = "Output directory (default: ~/Desktop/WEB-CODES)")]
    pub output_dir: Option<PathBuf>,

    /// Class pattern of file path headers
    #[arg(long, help = "Regex matched against the class of file path headers")]
    pub file_path_class: Option<String>,

    /// Class pattern of code tables
    #[arg(long, help = "Regex matched against the class of code tables")]
    pub code_table_class: Option<String>,

    /// Class pattern of code lines
    #[arg(long, help = "Regex matched against the class of code table rows")]
    pub code_line_class: Option<String>,

    /// Encoding used to read the page and write the files
    #[arg(short, long, help = "Text encoding label (e.g., utf-8, windows-1252)")]
    pub encoding: Option<String>,

    /// List the files that would be extracted without writing anything
    #[arg(short, long)]
    pub preview: bool,

    /// Refuse header paths that are absolute or contain '..'
    #[arg(long)]
    pub confine_paths: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to JSON configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write the extraction report as JSON to this file (`-` prints it instead)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Save the page as an archive (optionally with a name) instead of extracting it
    #[arg(long, num_args = 0..=1, value_name = "NAME")]
    pub save_archive: Option<Option<String>>,

    /// Directory holding archives
    #[arg(long, help = "Archives directory (default: ~/Desktop/HTML-ARCHIVES)")]
    pub archive_dir: Option<PathBuf>,

    /// List saved archives
    #[arg(long, conflicts_with_all = ["preview", "save_archive"])]
    pub list_archives: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Print a sample configuration file")]
    pub generate_config: bool,

    /// Persist the effective configuration
    #[arg(long, help = "Save the effective configuration to --config (or html-code-extractor.json)")]
    pub save_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match self.config.as_ref() {
            // --save-config may be creating this file.
            Some(path) if self.save_config && !path.exists() => Config::default(),
            path => Config::load_with_defaults(path)?,
        };

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_file_path_class(self.file_path_class.clone())
            .with_code_table_class(self.code_table_class.clone())
            .with_code_line_class(self.code_line_class.clone())
            .with_output_dir(self.output_dir.clone())
            .with_encoding(self.encoding.clone())
            .with_confine_paths(self.confine_paths.then_some(true))
            .with_archive_dir(self.archive_dir.clone())
    }

    /// Where `--save-config` writes.
    pub fn config_save_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// The archive name requested with `--save-archive`, if any.
    pub fn archive_name(&self) -> Option<&str> {
        self.save_archive.as_ref().and_then(|name| name.as_deref())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PathPolicy;

    #[test]
    fn test_parse_extraction_flags() {
        let cli = Cli::try_parse_from([
            "html-code-extractor",
            "page.html",
            "-o",
            "out",
            "--code-line-class",
            "diff-add",
            "-e",
            "latin-1",
            "--confine-paths",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("page.html")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.verbosity_level(), 2);
        assert!(!cli.preview);

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());
        assert_eq!(config.selectors.code_line_class, "diff-add");
        assert_eq!(config.selectors.file_path_class, "text-sm text-zinc-400 mb-2 font-mono");
        assert_eq!(config.output.encoding, "latin-1");
        assert_eq!(config.path_policy(), PathPolicy::Confined);
    }

    #[test]
    fn test_input_required_for_extraction() {
        assert!(Cli::try_parse_from(["html-code-extractor", "--preview"]).is_err());
        assert!(Cli::try_parse_from(["html-code-extractor", "--list-archives"]).is_ok());
        assert!(Cli::try_parse_from(["html-code-extractor", "--generate-config"]).is_ok());
    }

    #[test]
    fn test_save_archive_with_and_without_name() {
        let unnamed = Cli::try_parse_from(["html-code-extractor", "page.html", "--save-archive"]).unwrap();
        assert_eq!(unnamed.save_archive, Some(None));
        assert_eq!(unnamed.archive_name(), None);

        let named =
            Cli::try_parse_from(["html-code-extractor", "page.html", "--save-archive", "proj"]).unwrap();
        assert_eq!(named.archive_name(), Some("proj"));

        let absent = Cli::try_parse_from(["html-code-extractor", "page.html"]).unwrap();
        assert!(absent.save_archive.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["html-code-extractor", "page.html", "-q", "-v"]).is_err());
        let quiet = Cli::try_parse_from(["html-code-extractor", "page.html", "-q"]).unwrap();
        assert_eq!(quiet.verbosity_level(), 0);
    }

    #[test]
    fn test_save_config_to_new_file_starts_from_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let fresh = temp_dir.path().join("fresh.json");
        let fresh_arg = fresh.to_str().unwrap();

        let without_save =
            Cli::try_parse_from(["html-code-extractor", "page.html", "-c", fresh_arg]).unwrap();
        assert!(without_save.load_config().is_err());

        let with_save = Cli::try_parse_from([
            "html-code-extractor",
            "page.html",
            "-c",
            fresh_arg,
            "--save-config",
            "--code-line-class",
            "ins",
        ])
        .unwrap();
        let config = with_save.load_config().unwrap();
        assert_eq!(config.selectors.code_line_class, "ins");
        assert_eq!(config.selectors.code_table_class, "syntax-highlight");
    }

    #[test]
    fn test_config_save_path() {
        let cli = Cli::try_parse_from(["html-code-extractor", "page.html"]).unwrap();
        assert_eq!(cli.config_save_path(), PathBuf::from(DEFAULT_CONFIG_PATH));

        let cli = Cli::try_parse_from(["html-code-extractor", "page.html", "-c", "my.json"]).unwrap();
        assert_eq!(cli.config_save_path(), PathBuf::from("my.json"));
    }
}
