//! Batch OCR command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;

use crate::cli::helpers::{arrow, collect_image_paths, error, file_progress_bar, success};
use crate::config::Settings;
use crate::models::BatchRow;
use crate::ocr::ImageInput;
use crate::services::{DocumentProcessor, ExportFormat};

/// Process many images and export the result table.
pub async fn cmd_batch(
    settings: &Settings,
    paths: &[PathBuf],
    output: &Path,
    format: ExportFormat,
) -> anyhow::Result<()> {
    settings.api_key()?;

    let files = collect_image_paths(paths)?;
    if files.is_empty() {
        println!("{} No supported images found", style("!").yellow());
        return Ok(());
    }

    let processor = DocumentProcessor::from_settings(settings)?;
    println!(
        "{} Processing {} file(s) with {} concurrent request(s)",
        arrow(),
        files.len(),
        processor.concurrency()
    );

    let pb = file_progress_bar(files.len() as u64);
    let mut inputs = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for (index, file) in files.iter().enumerate() {
        match ImageInput::from_path(file).await {
            Ok(input) => inputs.push(input),
            Err(e) => {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                let row = BatchRow::failed(name, format!("Failed to read file: {}", e));
                pb.println(format!("  {} {}: {}", error(), row.filename, row.status_label()));
                pb.inc(1);
                unreadable.push((index, row));
            }
        }
    }

    let outcome = processor
        .process_batch_with(inputs, |row| {
            if !row.is_success() {
                pb.println(format!("  {} {}: {}", error(), row.filename, row.status_label()));
            }
            pb.set_message(row.filename.clone());
            pb.inc(1);
        })
        .await
        .with_failed_rows(unreadable);
    pb.finish_and_clear();

    let bytes = format.render(&outcome.rows)?;
    std::fs::write(output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} {}", success(), outcome.summary);
    println!(
        "  {} Results saved to {} ({})",
        style("→").dim(),
        output.display(),
        format
    );

    Ok(())
}
