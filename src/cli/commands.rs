//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stream pages of a video list query
#[derive(Parser, Debug)]
#[command(name = "pagestream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key
    #[arg(long, global = true, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum pages to fetch (0 = unbounded)
    #[arg(long, global = true)]
    pub max_pages: Option<u64>,

    /// Items per page hint (0 = remote default)
    #[arg(long, global = true)]
    pub per_page: Option<u32>,

    /// Stop after this many items (0 = unbounded)
    #[arg(long, global = true)]
    pub max_items: Option<u64>,

    /// Resume from a page token
    #[arg(long, global = true)]
    pub page_token: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true)]
    pub pacing_ms: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Currently most popular videos
    Popular,

    /// Search for videos
    Search {
        /// Search text
        query: Option<String>,

        /// Only return videos related to this video id
        #[arg(long)]
        related_to: Option<String>,
    },

    /// Look up videos by id
    Videos {
        /// Video ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one page per line)
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "pagestream",
            "--api-key",
            "k",
            "--max-pages",
            "2",
            "--per-page",
            "10",
            "search",
            "rust",
            "--related-to",
            "abc",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.max_pages, Some(2));
        assert_eq!(cli.per_page, Some(10));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Search { query, related_to } => {
                assert_eq!(query.as_deref(), Some("rust"));
                assert_eq!(related_to.as_deref(), Some("abc"));
            }
            other => panic!("Expected Search, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_videos_requires_ids() {
        assert!(Cli::try_parse_from(["pagestream", "videos"]).is_err());

        let cli = Cli::try_parse_from(["pagestream", "videos", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Commands::Videos { ref ids } if ids.len() == 2));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pagestream", "popular", "--max-items", "25", "-f", "pretty"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Popular));
        assert_eq!(cli.max_items, Some(25));
        assert_eq!(cli.format, OutputFormat::Pretty);
    }
}
