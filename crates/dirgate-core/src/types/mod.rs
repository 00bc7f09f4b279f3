//! Core types for Dirgate

mod directory;
mod identity;
mod profile;

pub use directory::*;
pub use identity::*;
pub use profile::*;
