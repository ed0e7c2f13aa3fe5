//! Command-line interface definitions for estate_news.
//!
//! Every argument is optional: with none, the built-in configuration is used.
//! Paths given here override the corresponding configuration fields.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Built-in defaults: Google News feed, template.html -> index.html
/// estate_news
///
/// # Custom sources and a separate output location
/// estate_news -c news.yaml -o public/index.html --json-output public/news.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "ESTATE_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template containing the placeholder marker
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Where to write the rendered page
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the article list as JSON to this path
    #[arg(long)]
    pub json_output: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(json) = &self.json_output {
            config.json_output_path = Some(json.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_arguments() {
        let cli = Cli::parse_from(["estate_news"]);
        assert!(cli.template.is_none());
        assert!(cli.output.is_none());
        assert!(cli.json_output.is_none());

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_short_flags_override_config() {
        let cli = Cli::parse_from([
            "estate_news",
            "-c",
            "/etc/estate_news.yaml",
            "-t",
            "site/template.html",
            "-o",
            "site/index.html",
            "--json-output",
            "site/news.json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/estate_news.yaml")));

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.template_path, PathBuf::from("site/template.html"));
        assert_eq!(config.output_path, PathBuf::from("site/index.html"));
        assert_eq!(config.json_output_path, Some(PathBuf::from("site/news.json")));
    }
}
