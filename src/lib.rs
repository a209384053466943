#[macro_use]
mod macros;
mod config;
mod gitdch;

pub mod error;
pub mod fmt;
pub mod git;

pub use crate::gitdch::GitDch;

// The default config file
pub(crate) const DEFAULT_CONFIG_FILE: &str = ".gitdch.toml";
