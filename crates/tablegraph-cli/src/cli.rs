//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tablegraph CLI - Turn semi-structured tables into property graphs.
#[derive(Debug, Parser)]
#[command(name = "tablegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TABLEGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log pipeline steps at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract graphs from table chunks
    Extract(ExtractArgs),

    /// Describe the cells of metric tables without calling a model
    Describe(DescribeArgs),

    /// Show or initialize the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// JSON file holding one table chunk or an array of them
    pub file: PathBuf,

    /// Skip model reformat and keyword enrichment; non-metric tables are skipped
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the describe command.
#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// JSON file holding one table chunk or an array of them
    pub file: PathBuf,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["tablegraph", "extract", "tables.json", "--offline"]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.file, PathBuf::from("tables.json"));
                assert!(args.offline);
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "tablegraph",
            "describe",
            "t.json",
            "--format",
            "json",
            "--no-color",
            "-v",
            "--config",
            "/tmp/tg.toml",
        ]);
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tg.toml")));
        assert!(matches!(cli.command, Command::Describe(_)));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["tablegraph", "config", "init", "--force"]);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Init { force: true })));

        let cli = Cli::parse_from(["tablegraph", "config", "show"]);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Show)));
    }

    #[test]
    fn test_missing_command_is_rejected() {
        assert!(Cli::try_parse_from(["tablegraph"]).is_err());
    }

    #[test]
    fn test_format_conversion() {
        assert!(matches!(OutputFormat::from(CliFormat::Quiet), OutputFormat::Quiet));
        assert!(matches!(OutputFormat::from(CliFormat::Table), OutputFormat::Table));
    }
}
