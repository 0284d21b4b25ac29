use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::{FileStore, ParamStore, RunArgs, RunConfig};
use crate::error::Result;
use crate::pipeline::DigestPipeline;
use crate::render;

/// Resolve run parameters, drive the digest pipeline, and write the page.
pub async fn run(args: RunArgs, output: PathBuf, store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;
    let config = RunConfig::resolve(&args, &store)?;

    info!(
        "Running digest: {} (max {} items, {})",
        config.rss_url, config.max_items, config.language
    );

    let pipeline = DigestPipeline::from_config(&config);
    let digest = pipeline.run().await?;
    let page = render::render_page(&digest.feed_title, &digest.results);

    if output.to_str() == Some("-") {
        io::stdout().write_all(page.as_bytes())?;
    } else {
        fs::write(&output, &page)?;
        println!("✅ Digest written to {}", output.display());
        println!("   Items summarized: {}", digest.results.len());
        if digest.failed > 0 {
            println!("   ❌ Items failed: {}", digest.failed);
        }
    }

    Ok(())
}

/// Show the stored parameters.
pub fn show(store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;
    let params = store.load()?;

    println!("📋 Stored parameters ({})", store.path().display());
    println!(
        "   api-key:   {}",
        params
            .api_key
            .as_deref()
            .map(mask_key)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "   rss-url:   {}",
        params.rss_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "   max-items: {}",
        params
            .max_items
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "   language:  {}",
        params.language.as_deref().unwrap_or("(not set)")
    );

    Ok(())
}

/// Clear the stored parameters.
pub fn clear(store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;
    store.clear()?;

    println!("✅ Cleared stored parameters ({})", store.path().display());
    Ok(())
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let cmd_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, cmd_name, &mut std::io::stdout());
}

/// Initialize logging based on verbosity flags
pub fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .init();

    debug!("Logging initialized");
    Ok(())
}

fn open_store(store_path: Option<PathBuf>) -> Result<FileStore> {
    match store_path {
        Some(path) => Ok(FileStore::at(path)),
        None => FileStore::open_default(),
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_key_hides_the_tail() {
        assert_eq!(mask_key("sk-abcdef123456"), "sk-a****");
        assert_eq!(mask_key("ab"), "ab****");
        assert_eq!(mask_key(""), "****");
    }

    #[test]
    fn test_open_store_uses_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.toml");

        let store = open_store(Some(path.clone())).unwrap();
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_clear_without_a_store_file_succeeds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        clear(Some(path)).unwrap();
    }
}
