//! authenticate command - verify an identifier and print its identity

use super::CommandContext;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use dirgate_auth::{AuthSettings, Authenticator, LdapConnector, LdapConnectorSettings};
use secrecy::SecretString;
use std::io::BufRead;
use std::sync::Arc;

/// Environment variable holding the password when stdin is not used
pub const PASSWORD_ENV: &str = "DIRGATE_PASSWORD";

/// Returns whether the attempt succeeded
pub async fn execute(ctx: &CommandContext, identifier: &str, password_stdin: bool) -> Result<bool> {
    ctx.config.validate().context("Invalid configuration")?;

    let secret = if password_stdin {
        read_secret_line(std::io::stdin().lock())?
    } else {
        match std::env::var(PASSWORD_ENV) {
            Ok(password) => SecretString::from(password),
            Err(_) => bail!("No password given: use --password-stdin or set {}", PASSWORD_ENV),
        }
    };

    let store = dirgate_metadata::connect_store(&ctx.config.database)
        .await
        .context("Failed to open the user record store")?;
    let connector = LdapConnector::new(LdapConnectorSettings::from(&ctx.config.directory));
    let authenticator = Authenticator::new(
        Arc::new(connector),
        store,
        AuthSettings::from_config(&ctx.config.directory),
    );

    match authenticator.authenticate(identifier, secret).await {
        Ok(identity) => {
            println!("{}", serde_json::to_string_pretty(&identity)?);
            Ok(true)
        }
        Err(failure) => {
            // the typed reason has already been logged
            eprintln!("{} {}", "error:".red().bold(), failure.user_message());
            Ok(false)
        }
    }
}

/// First line of `reader` without its line terminator
fn read_secret_line(mut reader: impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(SecretString::from(line))
}
