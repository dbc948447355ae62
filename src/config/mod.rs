#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "catalog")]
#[command(about = "Flat-file book and user catalog")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Books file, overrides catalog.books_path
    #[arg(long)]
    pub books: Option<String>,

    /// Users file, overrides catalog.users_path
    #[arg(long)]
    pub users: Option<String>,

    /// Write removals and updates immediately
    #[arg(long)]
    pub auto_persist: bool,

    /// Reject malformed records instead of defaulting their fields
    #[arg(long)]
    pub strict: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: cli::Command,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file (if any) and applies command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(books) = &self.books {
            config.catalog.books_path = books.clone();
        }
        if let Some(users) = &self.users {
            config.catalog.users_path = users.clone();
        }
        config.store.auto_persist |= self.auto_persist;
        config.store.strict |= self.strict;

        config.validate()?;
        Ok(config)
    }
}
