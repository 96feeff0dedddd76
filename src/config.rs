use crate::error::{ExtractorError, Result};
use crate::extractor::{resolve_encoding, PathPolicy, Selectors};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILES: [&str; 2] = ["html-code-extractor.json", ".html-code-extractor.json"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
    pub archive: ArchiveConfig,
    pub ui: UiConfig,
}

/// Class patterns locating headers, code tables and code lines.
///
/// Each value is a regular expression searched anywhere in an element's
/// `class` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub file_path_class: String,
    pub code_table_class: String,
    pub code_line_class: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
    pub encoding: String,
    pub confine_paths: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    pub window_size: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            file_path_class: "text-sm text-zinc-400 mb-2 font-mono".to_string(),
            code_table_class: "syntax-highlight".to_string(),
            code_line_class: "line added".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: home_relative("Desktop/WEB-CODES"),
            encoding: "utf-8".to_string(),
            confine_paths: false,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: home_relative("Desktop/HTML-ARCHIVES"),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            window_size: "800x600".to_string(),
        }
    }
}

fn home_relative(relative: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(relative)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractorError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ExtractorError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ExtractorError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in &DEFAULT_CONFIG_FILES {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref pattern) = cli_args.file_path_class {
            self.selectors.file_path_class = pattern.clone();
        }

        if let Some(ref pattern) = cli_args.code_table_class {
            self.selectors.code_table_class = pattern.clone();
        }

        if let Some(ref pattern) = cli_args.code_line_class {
            self.selectors.code_line_class = pattern.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.default_dir = output_dir.clone();
        }

        if let Some(ref encoding) = cli_args.encoding {
            self.output.encoding = encoding.clone();
        }

        if let Some(confine) = cli_args.confine_paths {
            self.output.confine_paths = confine;
        }

        if let Some(ref archive_dir) = cli_args.archive_dir {
            self.archive.directory = archive_dir.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;

        std::fs::write(path, content)
            .map_err(|e| ExtractorError::Config {
                message: format!("Failed to write config file {}: {}", path.display(), e),
            })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let patterns = [
            ("file_path_class", &self.selectors.file_path_class),
            ("code_table_class", &self.selectors.code_table_class),
            ("code_line_class", &self.selectors.code_line_class),
        ];
        for (name, pattern) in patterns {
            if pattern.trim().is_empty() {
                return Err(ExtractorError::Config {
                    message: format!("Selector {} must not be empty", name),
                });
            }
        }
        Selectors::compile(&self.selectors)?;

        resolve_encoding(&self.output.encoding)?;

        if !is_window_size(&self.ui.window_size) {
            return Err(ExtractorError::Config {
                message: format!(
                    "Window size must look like WIDTHxHEIGHT, got '{}'",
                    self.ui.window_size
                ),
            });
        }

        Ok(())
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        resolve_encoding(&self.output.encoding)
    }

    pub fn output_dir(&self) -> PathBuf {
        expand_home(&self.output.default_dir)
    }

    pub fn archive_dir(&self) -> PathBuf {
        expand_home(&self.archive.directory)
    }

    pub fn path_policy(&self) -> PathPolicy {
        if self.output.confine_paths {
            PathPolicy::Confined
        } else {
            PathPolicy::Verbatim
        }
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.output.default_dir = PathBuf::from("~/Desktop/WEB-CODES");
        sample_config.archive.directory = PathBuf::from("~/Desktop/HTML-ARCHIVES");
        serde_json::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

fn is_window_size(value: &str) -> bool {
    match value.split_once('x') {
        Some((width, height)) => {
            !width.is_empty()
                && !height.is_empty()
                && width.chars().all(|c| c.is_ascii_digit())
                && height.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub file_path_class: Option<String>,
    pub code_table_class: Option<String>,
    pub code_line_class: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub encoding: Option<String>,
    pub confine_paths: Option<bool>,
    pub archive_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_path_class(mut self, pattern: Option<String>) -> Self {
        self.file_path_class = pattern;
        self
    }

    pub fn with_code_table_class(mut self, pattern: Option<String>) -> Self {
        self.code_table_class = pattern;
        self
    }

    pub fn with_code_line_class(mut self, pattern: Option<String>) -> Self {
        self.code_line_class = pattern;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_confine_paths(mut self, confine: Option<bool>) -> Self {
        self.confine_paths = confine;
        self
    }

    pub fn with_archive_dir(mut self, archive_dir: Option<PathBuf>) -> Self {
        self.archive_dir = archive_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.selectors.code_table_class, "syntax-highlight");
        assert_eq!(config.selectors.code_line_class, "line added");
        assert_eq!(config.output.encoding, "utf-8");
        assert!(config.output.default_dir.ends_with("Desktop/WEB-CODES"));
        assert!(config.archive.directory.ends_with("Desktop/HTML-ARCHIVES"));
        assert_eq!(config.path_policy(), PathPolicy::Verbatim);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.selectors.code_line_class = "line[".to_string();
        assert!(matches!(
            config.validate(),
            Err(ExtractorError::InvalidSelector { .. })
        ));

        let mut config = Config::default();
        config.selectors.file_path_class = "  ".to_string();
        assert!(matches!(config.validate(), Err(ExtractorError::Config { .. })));

        let mut config = Config::default();
        config.output.encoding = "not-an-encoding".to_string();
        assert!(matches!(
            config.validate(),
            Err(ExtractorError::UnknownEncoding { .. })
        ));

        let mut config = Config::default();
        config.ui.window_size = "800by600".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.selectors.code_line_class = "diff-add".to_string();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.selectors, config.selectors);
        assert_eq!(loaded_config.ui.window_size, "800x600");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"output": {{"encoding": "latin-1"}}}}"#).unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.encoding, "latin-1");
        assert!(!config.output.confine_paths);
        assert_eq!(config.selectors, SelectorConfig::default());
        assert_eq!(config.ui.theme, "default");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{ not json").unwrap();

        let error = Config::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(error, ExtractorError::Config { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Config::load_with_defaults(Some("does/not/exist.json")).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_code_line_class(Some("diff-add".to_string()))
            .with_output_dir(Some(PathBuf::from("out")))
            .with_encoding(Some("windows-1252".to_string()))
            .with_confine_paths(Some(true));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.selectors.code_line_class, "diff-add");
        assert_eq!(config.selectors.code_table_class, "syntax-highlight");
        assert_eq!(config.output_dir(), PathBuf::from("out"));
        assert_eq!(config.encoding().unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(config.path_policy(), PathPolicy::Confined);
    }

    #[test]
    fn test_home_expansion() {
        let expanded = expand_home(Path::new("~/Desktop/WEB-CODES"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("Desktop/WEB-CODES"));
        }
        assert_eq!(expand_home(Path::new("relative/dir")), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        let value: serde_json::Value = serde_json::from_str(&sample).unwrap();
        assert!(value.get("selectors").is_some());
        assert!(value.get("output").is_some());
        assert!(value.get("archive").is_some());
        assert!(value.get("ui").is_some());
        assert_eq!(value["output"]["default_dir"], "~/Desktop/WEB-CODES");
        assert_eq!(value["archive"]["directory"], "~/Desktop/HTML-ARCHIVES");

        let loaded: Config = serde_json::from_str(&sample).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(loaded.output_dir(), home.join("Desktop/WEB-CODES"));
            assert_eq!(loaded.archive_dir(), home.join("Desktop/HTML-ARCHIVES"));
        }
    }
}
