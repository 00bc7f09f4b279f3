//! check-config command - validate and print the effective configuration

use super::CommandContext;
use anyhow::{Context, Result};
use colored::Colorize;
use dirgate_core::config::DirgateConfig;

pub fn execute(ctx: &CommandContext) -> Result<bool> {
    let rendered = render(&ctx.config)?;
    println!("{}", rendered);

    match ctx.config.validate() {
        Ok(()) => {
            println!("{}", "Configuration is valid".green());
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            Ok(false)
        }
    }
}

/// TOML rendering with the manager password omitted and the database URL redacted
fn render(config: &DirgateConfig) -> Result<String> {
    let mut shown = config.clone();
    shown.database.url = dirgate_metadata::redact_url(&shown.database.url);
    toml::to_string_pretty(&shown).context("Failed to render configuration")
}
