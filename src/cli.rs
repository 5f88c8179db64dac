mod calculate;
mod columns;
mod prices;
mod time;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cli::{calculate::CalculateArgs, columns::ColumnsArgs, prices::PricesArgs},
    core::aggregate::IntegrationOptions,
    prelude::*,
    service::Calculator,
    settings::Settings,
    store::memory::MemoryStore,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Calculate the bill of a client's sensor column over a billing window.
    #[clap(name = "calculate")]
    Calculate(Box<CalculateArgs>),

    /// Show the default prices.
    #[clap(name = "prices")]
    Prices(PricesArgs),

    /// List the sensor columns of a client.
    #[clap(name = "columns")]
    Columns(ColumnsArgs),
}

impl Command {
    pub fn run(self) -> Result {
        match self {
            Self::Calculate(args) => args.run(),
            Self::Prices(args) => args.run(),
            Self::Columns(args) => args.run(),
        }
    }
}

#[derive(Parser)]
pub struct SettingsArgs {
    /// TOML file with the default prices, the tariff schedule, and the integration options.
    #[clap(long = "settings", env = "CFE_SETTINGS", default_value = "cfe.toml")]
    settings_path: PathBuf,
}

impl SettingsArgs {
    pub fn load(&self) -> Result<Settings> {
        Settings::read_from(&self.settings_path)
    }
}

#[derive(Parser)]
pub struct StoreArgs {
    /// JSON file with the exported meter readings.
    #[clap(long = "store", env = "CFE_STORE", default_value = "lecturas.json")]
    store_path: PathBuf,
}

impl StoreArgs {
    pub fn calculator(
        &self,
        settings: &Settings,
        options: IntegrationOptions,
    ) -> Result<Calculator<MemoryStore>> {
        Ok(Calculator::builder()
            .store(MemoryStore::read_from(&self.store_path)?)
            .schedule(settings.schedule())
            .default_prices(settings.default_prices())
            .options(options)
            .build())
    }
}
