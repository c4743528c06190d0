use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use voxchat::clipboard::{ConfiguredClipboard, copy_to_clipboard};
use voxchat::config::{AppConfig, ClipboardBackend};
use voxchat::logging::init_logging;

/// Text to copy: the arguments joined by spaces, or all of stdin when none are given.
async fn read_input() -> Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read stdin")?;
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_logging(&config);

    let text = read_input().await?;

    // This process exits right after copying, so on Linux the write has to
    // keep serving the selection until another application takes it over.
    let clipboard = ConfiguredClipboard::from_config(&config)
        .await
        .context("Failed to open clipboard")?
        .wait_until_replaced(true);

    if config.clipboard == ClipboardBackend::System {
        tracing::debug!("serving clipboard until another application replaces it");
    }

    copy_to_clipboard(&clipboard, &text).await?;
    tracing::info!(chars = text.chars().count(), backend = ?config.clipboard, "copied");

    Ok(())
}
