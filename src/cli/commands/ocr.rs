//! Single-image OCR command.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::cli::helpers::{arrow, success};
use crate::config::Settings;
use crate::ocr::ImageInput;
use crate::services::{display_fields, DocumentProcessor};
use crate::utils::format_size;

/// Run OCR on one image and print or save the text.
pub async fn cmd_ocr(
    settings: &Settings,
    file: &Path,
    output: Option<&Path>,
    json: bool,
    raw: bool,
) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("Image file not found: {}", file.display());
    }
    settings.api_key()?;

    let processor = DocumentProcessor::from_settings(settings)?;
    let input = ImageInput::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    eprintln!(
        "{} Processing image: {} ({})",
        arrow(),
        file.display(),
        format_size(input.bytes.len() as u64)
    );
    if raw {
        eprintln!("  {} Post-processing disabled", style("→").dim());
    }

    let doc = processor.process_document(&input, !raw).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&doc)?;
        match output {
            Some(path) => write_output(path, &rendered)?,
            None => println!("{}", rendered),
        }
        return Ok(());
    }

    match output {
        Some(path) => write_output(path, &doc.processed_text)?,
        None => {
            println!("\n=== EXTRACTED TEXT ===");
            println!("{}", doc.processed_text);
            println!("======================");
        }
    }

    let fields = display_fields(&doc.fields);
    if !fields.is_empty() {
        eprintln!();
        for (label, value) in fields {
            eprintln!("  {}: {}", style(label).bold(), value);
        }
    }
    eprintln!(
        "\n{} {} page(s) in {:.2}s",
        success(),
        doc.page_count(),
        doc.processing_secs()
    );

    Ok(())
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("{} Results saved to: {}", success(), path.display());
    Ok(())
}
