//! Command-line interface definitions.
//!
//! All options can be provided via command-line flags or environment
//! variables. Paths given here override the corresponding `output` entries
//! in the YAML configuration.

use clap::Parser;

/// Command-line arguments for the policy-news harvester.
///
/// # Examples
///
/// ```sh
/// # Run with the repo-local config
/// policy_news_watch --config config.yaml
///
/// # Redirect the outputs without touching the config
/// policy_news_watch -c config.yaml --csv-out /tmp/news.csv --added-count-out /tmp/added.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML run configuration
    #[arg(short, long, default_value = "config.yaml", env = "POLICY_NEWS_CONFIG")]
    pub config: String,

    /// Override the CSV store path from the config
    #[arg(long, env = "POLICY_NEWS_CSV_OUT")]
    pub csv_out: Option<String>,

    /// Override the added-count side file path from the config
    #[arg(long, env = "POLICY_NEWS_ADDED_COUNT_OUT")]
    pub added_count_out: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["policy_news_watch"]);
        assert_eq!(cli.config, "config.yaml");
        assert!(cli.csv_out.is_none());
        assert!(cli.added_count_out.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "policy_news_watch",
            "-c",
            "/etc/policy_news/config.yaml",
            "--csv-out",
            "/tmp/news.csv",
            "--added-count-out",
            "/tmp/added.txt",
        ]);
        assert_eq!(cli.config, "/etc/policy_news/config.yaml");
        assert_eq!(cli.csv_out.as_deref(), Some("/tmp/news.csv"));
        assert_eq!(cli.added_count_out.as_deref(), Some("/tmp/added.txt"));
    }
}
