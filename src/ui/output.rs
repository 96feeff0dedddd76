use crate::archive::{ArchiveInfo, ArchiveSummary, SavedArchive};
use crate::error::{ExtractorError, UserFriendlyError};
use crate::extractor::{CodeBlocks, ExtractionReport, Materialized};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");
static FILE: Emoji = Emoji("📄 ", "- ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &ExtractorError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// List the files a page would produce. File contents are shown from `-v`.
    pub fn print_preview(&self, source: &Path, blocks: &CodeBlocks) {
        match self.mode {
            OutputMode::Human => {
                self.print_header(&format!("Files in {}", source.display()));
                for block in blocks {
                    let count = format!("({} lines)", block.lines.len());
                    if self.use_colors {
                        println!("{}{} {}", FILE, style(&block.path).bold(), style(count).dim());
                    } else {
                        println!("- {} {}", block.path, count);
                    }

                    if self.verbose_level >= 1 {
                        for line in &block.lines {
                            println!("    {}", line);
                        }
                        println!();
                    }
                }
                if !self.quiet {
                    self.print_separator();
                    println!(
                        "  {} files, {} lines",
                        blocks.len(),
                        blocks.total_lines()
                    );
                }
            }
            OutputMode::Json => {
                let files: Vec<_> = blocks
                    .iter()
                    .map(|block| {
                        serde_json::json!({
                            "path": block.path,
                            "lines": block.lines.len(),
                            "content": block.content(),
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "preview",
                    "source": source.display().to_string(),
                    "files": files,
                }));
            }
            OutputMode::Plain => {
                for block in blocks {
                    println!("FILE: {} ({} lines)", block.path, block.lines.len());
                }
                println!("TOTAL: {} files", blocks.len());
            }
        }
    }

    // Summary and reporting
    pub fn print_extraction_summary(&self, result: &Materialized, output_dir: &Path) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(result, output_dir),
            OutputMode::Json => self.print_json_summary(result, output_dir),
            OutputMode::Plain => self.print_plain_summary(result, output_dir),
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Human | OutputMode::Plain => print!("{}", report.render_text()),
        }
    }

    pub fn print_archive_saved(&self, saved: &SavedArchive) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "archive_saved",
                "directory": saved.directory.display().to_string(),
                "metadata": saved.metadata,
                "files": saved.blocks.len(),
            })),
            _ => {
                self.success(&format!(
                    "Saved archive to {} ({} code files)",
                    saved.directory.display(),
                    saved.blocks.len()
                ));
            }
        }
    }

    pub fn print_archive_list(&self, archives_dir: &Path, archives: &[ArchiveSummary]) {
        match self.mode {
            OutputMode::Human => {
                self.print_header(&format!("Archives in {}", archives_dir.display()));
                if archives.is_empty() {
                    println!("  No archives found.");
                }
                for archive in archives {
                    if self.use_colors {
                        println!(
                            "{}{}  {}",
                            FILE,
                            style(&archive.name).bold(),
                            style(&archive.metadata.title).dim()
                        );
                    } else {
                        println!("- {}  {}", archive.name, archive.metadata.title);
                    }
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(archives).unwrap_or_else(|_| "[]".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                for archive in archives {
                    println!("ARCHIVE: {} ({})", archive.name, archive.path.display());
                }
            }
        }
    }

    pub fn print_archive_info(&self, info: &ArchiveInfo) {
        if !self.should_show_message(1) || self.mode == OutputMode::Json {
            return;
        }

        let metadata = &info.metadata;
        let details = [
            format!("Archive: {}", info.name),
            format!("Date Saved: {}", metadata.date_saved),
            format!("Title: {}", metadata.title),
            format!("Original File: {}", metadata.original_file),
            format!("File Size: {}", format_bytes(metadata.file_size)),
        ];
        for line in &details {
            self.info(line);
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, result: &Materialized, output_dir: &Path) {
        println!();
        self.print_separator();

        let headline = if result.errors.is_empty() {
            "Code extraction completed!"
        } else {
            "Code extraction completed with errors"
        };
        if self.use_colors {
            let styled = if result.errors.is_empty() {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{} {}", styled, CHECKMARK);
        } else {
            println!("✓ {}", headline);
        }

        println!();
        let rows = [
            ("Files created:", result.created.len().to_string()),
            ("Output:", output_dir.display().to_string()),
            ("Encoding:", result.encoding.clone()),
            ("Time taken:", format_duration(result.elapsed)),
        ];
        for (label, value) in rows {
            if self.use_colors {
                println!("  {:<15}{}", label, style(value).cyan().bold());
            } else {
                println!("  {:<15}{}", label, value);
            }
        }

        if !result.skipped_empty.is_empty() {
            println!("  {:<15}{}", "Empty blocks:", result.skipped_empty.len());
        }

        if !result.errors.is_empty() {
            println!("  {:<15}{}", "Errors:", result.errors.len());
            for failure in &result.errors {
                println!("    - {}: {}", failure.path, failure.reason);
            }
        }

        if self.verbose_level >= 1 {
            println!();
            for path in &result.created {
                println!("  {}{}", FILE, path);
            }
        }

        self.print_separator();
    }

    fn print_json_summary(&self, result: &Materialized, output_dir: &Path) {
        let summary = serde_json::json!({
            "type": "summary",
            "output_directory": output_dir.display().to_string(),
            "files_created": result.created,
            "files_with_errors": result.errors,
            "empty_blocks": result.skipped_empty,
            "encoding": result.encoding,
            "duration_ms": result.elapsed.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, result: &Materialized, output_dir: &Path) {
        println!("COMPLETED: Code extraction");
        println!("Output: {}", output_dir.display());
        for path in &result.created {
            println!("CREATED: {}", path);
        }
        for failure in &result.errors {
            println!("FAILED: {}: {}", failure.path, failure.reason);
        }
        println!("Files created: {}", result.created.len());
        println!("Duration: {:?}", result.elapsed);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
