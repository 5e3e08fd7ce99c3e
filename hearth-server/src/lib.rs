pub mod config;
pub mod database;
pub mod errors;
pub mod identity;
pub mod recipes;
pub mod server;
pub mod telemetry;
pub mod validation;

use clap::Parser;

/// Command line shared by the server binaries
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the YAML configuration file
    #[clap(long)]
    pub config: String,

    /// The address and optionally port to bind to, overriding the configuration
    #[clap(long, env = "HEARTH_ADDRESS")]
    pub address: Option<String>,
}

impl Args {
    /// Read the configuration file and apply command line overrides.
    pub fn load_config(&self) -> anyhow::Result<config::Config> {
        let mut config = config::Config::load(&self.config)?;
        if let Some(address) = &self.address {
            config.server.address = address.clone();
        }
        Ok(config)
    }
}
