pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{RunArgs, DEFAULT_TIMEOUT_SECS};
use crate::error::Result;
use crate::summary::provider::{DEFAULT_API_URL, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "rss-digest")]
#[command(about = "Summarize RSS feed items with a language model into an HTML digest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Parameter store file path
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the feed, summarize its items, and write the digest page
    Run {
        /// Bearer token for the completion endpoint
        #[arg(long, env = "RSS_DIGEST_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// RSS feed URL
        #[arg(long)]
        rss_url: Option<String>,

        /// Maximum number of feed items to summarize
        #[arg(long)]
        max_items: Option<usize>,

        /// Language the summaries should be written in
        #[arg(long)]
        language: Option<String>,

        /// Model identifier sent to the completion endpoint
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Completion endpoint URL
        #[arg(long, default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Prompt template; {title}, {description}, and {language} are
        /// substituted per item
        #[arg(long)]
        prompt: Option<String>,

        /// Output file for the rendered page, or "-" for stdout
        #[arg(short, long, default_value = "digest.html")]
        output: PathBuf,
    },

    /// Show the stored parameters
    Show,

    /// Clear the stored parameters
    Clear,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::init_logging(self.debug, self.verbose)?;

        match self.command {
            Commands::Run {
                api_key,
                rss_url,
                max_items,
                language,
                model,
                api_url,
                timeout,
                prompt,
                output,
            } => {
                let args = RunArgs {
                    api_key,
                    rss_url,
                    max_items,
                    language,
                    model,
                    api_url,
                    timeout,
                    prompt,
                };
                commands::run(args, output, self.store).await
            }
            Commands::Show => commands::show(self.store),
            Commands::Clear => commands::clear(self.store),
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}
