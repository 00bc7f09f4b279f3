//! CLI command implementations

pub mod authenticate;
pub mod check_config;

use dirgate_core::config::DirgateConfig;

/// Context passed to all commands
pub struct CommandContext {
    pub config: DirgateConfig,
}
