//! Tablegraph CLI - Command-line interface for table graph extraction.

use clap::Parser;
use tablegraph_cli::cli::ConfigCommand;
use tablegraph_cli::commands;
use tablegraph_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

// Not `#[tokio::main]`: the blocking HTTP client must be created and dropped
// outside the runtime, so the extract command builds its own.
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> tablegraph_cli::Result<()> {
    let cli = Cli::parse();

    // Log to stderr so stdout stays machine-readable
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter),
        Command::Describe(args) => commands::execute_describe(args, &formatter),
        Command::Config(ConfigCommand::Show) => commands::execute_config_show(&config),
        Command::Config(ConfigCommand::Init { force }) => {
            commands::execute_config_init(cli.config.as_deref(), force, &formatter)
        }
    }
}
