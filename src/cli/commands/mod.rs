//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod batch;
mod config_cmd;
mod init;
mod ocr;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions, Settings};
use crate::services::ExportFormat;

#[derive(Parser)]
#[command(name = "docuflow")]
#[command(about = "Thai document OCR and structured data extraction using Mistral AI")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: ./config.yaml)
    #[arg(short, long, global = true, env = "DOCUFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface (default when no command is given)
    Serve {
        /// Bind address: PORT, HOST, or HOST:PORT (default from config, 0.0.0.0:7860)
        bind: Option<String>,
    },

    /// Run OCR on a single image
    Ocr {
        /// Image file (JPG, PNG, WebP, TIFF)
        file: PathBuf,
        /// Write the extracted text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Skip post-processing
        #[arg(long)]
        raw: bool,
    },

    /// Process several images and export a result table
    Batch {
        /// Image files or directories (directories are not searched recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output file
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
        /// Export format: csv, json, jsonl
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Write a sample config.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { bind: None });

    let options = LoadOptions {
        config_path: cli.config,
        require_file: false,
    };

    // Init writes the config file, so it must not require a valid one.
    let settings = if matches!(command, Commands::Init { .. }) {
        Settings::default()
    } else {
        load_settings_with_options(&options)?
    };

    match command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Ocr {
            file,
            output,
            json,
            raw,
        } => ocr::cmd_ocr(&settings, &file, output.as_deref(), json, raw).await,
        Commands::Batch {
            paths,
            output,
            format,
        } => batch::cmd_batch(&settings, &paths, &output, format).await,
        Commands::Config => config_cmd::cmd_config_show(&settings).await,
        Commands::Init { force } => init::cmd_init(options.config_path.as_deref(), force).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["docuflow"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_batch_args() {
        let cli = Cli::try_parse_from([
            "docuflow", "batch", "scans", "extra.png", "-f", "jsonl", "-o", "out.jsonl",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Batch {
                paths,
                output,
                format,
            }) => {
                assert_eq!(paths.len(), 2);
                assert_eq!(output, PathBuf::from("out.jsonl"));
                assert_eq!(format, ExportFormat::Jsonl);
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_batch_requires_paths() {
        assert!(Cli::try_parse_from(["docuflow", "batch"]).is_err());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["docuflow", "ocr", "a.png", "-c", "alt.yaml", "--raw"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        assert!(matches!(cli.command, Some(Commands::Ocr { raw: true, .. })));
    }
}
