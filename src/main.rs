use clap::Parser;
use html_code_extractor::{
    Cli, CodeExtractor, ExtractionReport, ExtractorError, OutputFormatter, OutputMode,
    UserFriendlyError,
};
use std::process;

const REPORT_TO_STDOUT: &str = "-";

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbosity_level()) {
        eprintln!("Warning: {:#}", e);
    }

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let extractor = match CodeExtractor::from_cli(&cli) {
        Ok(extractor) => extractor,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.save_config {
        let path = cli.config_save_path();
        match extractor.config().save_to_file(&path) {
            Ok(()) => extractor
                .output_formatter()
                .success(&format!("Saved configuration to {}", path.display())),
            Err(e) => {
                extractor.handle_error(&e);
                return exit_code_for(&e);
            }
        }
    }

    if cli.list_archives {
        return match extractor.list_archives() {
            Ok(_) => 0,
            Err(e) => {
                extractor.handle_error(&e);
                exit_code_for(&e)
            }
        };
    }

    let Some(input) = cli.input.as_deref() else {
        return 0;
    };

    if cli.save_archive.is_some() {
        return match extractor.save_archive(input, cli.archive_name()).await {
            Ok(_) => 0,
            Err(e) => {
                extractor.handle_error(&e);
                exit_code_for(&e)
            }
        };
    }

    if cli.preview {
        return match extractor.preview(input).await {
            Ok(report) => write_report(&cli, &extractor, &report),
            Err(e) => {
                extractor.handle_error(&e);
                exit_code_for(&e)
            }
        };
    }

    match extractor.extract(input).await {
        Ok(report) => {
            let report_exit = write_report(&cli, &extractor, &report);
            if report_exit != 0 {
                return report_exit;
            }

            if report.created.is_empty() {
                extractor.handle_error(&ExtractorError::NoFilesCreated);
                1
            } else if report.errors.is_empty() {
                0
            } else {
                2 // Some files could not be written
            }
        }
        Err(e) => {
            extractor.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "html_code_extractor=warn",
        1 => "html_code_extractor=info",
        _ => "html_code_extractor=debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn write_report(cli: &Cli, extractor: &CodeExtractor, report: &ExtractionReport) -> i32 {
    let Some(ref report_path) = cli.report else {
        return 0;
    };

    if report_path.as_os_str() == REPORT_TO_STDOUT {
        extractor.output_formatter().print_extraction_report(report);
        return 0;
    }

    match report.save_json(report_path) {
        Ok(()) => {
            extractor
                .output_formatter()
                .info(&format!("Wrote report to {}", report_path.display()));
            0
        }
        Err(e) => {
            extractor.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &ExtractorError) -> i32 {
    match error {
        ExtractorError::InputNotFound { .. } => 3,
        ExtractorError::Decode { .. } => 4,
        ExtractorError::UnknownEncoding { .. }
        | ExtractorError::InvalidSelector { .. }
        | ExtractorError::Config { .. } => 5,
        ExtractorError::Archive { .. } => 6,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let Some(ref config_path) = cli.config else {
        println!("{}", html_code_extractor::Config::create_sample_config());
        return 0;
    };

    match CodeExtractor::generate_sample_config(config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!(
                "  html-code-extractor <page.html> --config {}",
                config_path.display()
            );
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &ExtractorError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
