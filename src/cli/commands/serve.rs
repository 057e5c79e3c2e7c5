//! Web server command.

use console::style;

use crate::cli::helpers::{arrow, error};
use crate::config::{Config, Settings};

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    if settings.config_path.is_none() && settings.api_key().is_err() {
        eprintln!("{} ไม่พบไฟล์ config.yaml", style("!").yellow());
        eprintln!("  กรุณาสร้างไฟล์ config.yaml และเพิ่ม Mistral API key");
        eprintln!("  (run `docuflow init` or set MISTRAL_API_KEY)\n");
        eprintln!("{}", Config::sample());
        anyhow::bail!("No configuration found");
    }
    if settings.api_key().is_err() {
        eprintln!(
            "{} No Mistral API key configured; OCR requests will fail until mistral.token or MISTRAL_API_KEY is set",
            error()
        );
    }

    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, &settings.server.host, settings.server.port)?,
        None => (settings.server.host.clone(), settings.server.port),
    };

    println!("{} เริ่มต้น DocuFlow - ระบบแยกข้อความภาษาไทย", arrow());
    println!(
        "{} Starting DocuFlow server at http://{}:{}",
        arrow(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> default host:8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1:default port
/// - Host and port: "127.0.0.1:8080"
fn parse_bind_address(
    bind: &str,
    default_host: &str,
    default_port: u16,
) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok((default_host.to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid port in bind address: {}", bind))?;
        return Ok((host.to_string(), port));
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), default_port))
}
