//! Configuration display command.

use console::style;

use crate::config::Settings;

/// Print the effective settings with the API token redacted.
pub async fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    let source = settings
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults, no config file)".to_string());

    println!("{} {}", style("Config:").bold(), source);
    println!();
    println!("{}", style("mistral").cyan());
    println!("  token:                {}", settings.redacted_token());
    println!("  model:                {}", settings.mistral.model);
    println!("  base_url:             {}", settings.mistral.base_url);
    println!("  timeout_secs:         {}", settings.mistral.timeout_secs);
    println!("  include_image_base64: {}", settings.mistral.include_image_base64);
    println!("  request_delay_ms:     {}", settings.mistral.request_delay_ms);
    println!("{}", style("server").cyan());
    println!("  host:                 {}", settings.server.host);
    println!("  port:                 {}", settings.server.port);
    println!("  max_upload_mb:        {}", settings.server.max_upload_mb);
    println!("  max_batches:          {}", settings.server.max_batches);
    println!("{}", style("processing").cyan());
    println!("  concurrency:          {}", settings.processing.concurrency);
    println!("  preview_chars:        {}", settings.processing.preview_chars);
    let steps: Vec<&str> = settings.post_processors.iter().map(|p| p.as_str()).collect();
    println!("  post_processors:      {}", steps.join(", "));

    Ok(())
}
