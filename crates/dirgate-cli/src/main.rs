//! Dirgate - directory-backed authentication
//!
//! Authenticates an identifier against an LDAP directory and the local user
//! record store.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::CommandContext;
use dirgate_core::config::DirgateConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "dirgate")]
#[command(author = "Dirgate Team")]
#[command(version = dirgate_core::VERSION)]
#[command(about = "Directory-backed authentication", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DIRGATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DIRGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true, env = "DIRGATE_LOG_FORMAT")]
    log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate an identifier and print the resulting identity
    Authenticate {
        /// Claimed identifier
        #[arg(short, long)]
        identifier: String,

        /// Read the password from the first line of stdin instead of DIRGATE_PASSWORD
        #[arg(long)]
        password_stdin: bool,
    },

    /// Validate the configuration and print it with secrets redacted
    CheckConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("dirgate {}", dirgate_core::VERSION);
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config);

    let ctx = CommandContext { config };

    let success = match cli.command {
        Commands::Authenticate {
            identifier,
            password_stdin,
        } => commands::authenticate::execute(&ctx, &identifier, password_stdin).await?,
        Commands::CheckConfig => commands::check_config::execute(&ctx)?,
        Commands::Version => true,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// File (if given), then `DIRGATE_*` variables, then command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<DirgateConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = DirgateConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path))?;
            config.apply_env();
            config
        }
        None => DirgateConfig::from_env(),
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    Ok(config)
}

fn init_logging(config: &DirgateConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
