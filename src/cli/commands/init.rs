//! Initialize command.

use std::path::Path;

use console::style;

use crate::cli::helpers::success;
use crate::config::Config;

/// Write the sample config file.
pub async fn cmd_init(config_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = Config::resolve_path(config_path);

    if path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("!").yellow(),
            path.display()
        );
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, Config::sample()).await?;

    println!("{} Wrote {}", success(), path.display());
    println!("  Add your Mistral API key under mistral.token, or set MISTRAL_API_KEY");

    Ok(())
}
