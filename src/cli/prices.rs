use clap::Parser;

use crate::{
    cli::SettingsArgs,
    core::pricing::{DistributionDemand, PriceOverrides},
    prelude::*,
    quantity::{
        cost::Cost,
        percent::Percent,
        rate::{KilowattHourRate, KilowattRate},
    },
    tables::build_prices_table,
};

/// Price overrides for a single calculation.
#[derive(Parser)]
pub struct PriceArgs {
    /// Base energy price, pesos per kilowatt-hour.
    #[clap(long = "precio-base")]
    precio_base: Option<KilowattHourRate>,

    /// Intermedio energy price, pesos per kilowatt-hour.
    #[clap(long = "precio-intermedio")]
    precio_intermedio: Option<KilowattHourRate>,

    /// Punta energy price, pesos per kilowatt-hour.
    #[clap(long = "precio-punta")]
    precio_punta: Option<KilowattHourRate>,

    /// Capacity price, pesos per kilowatt of billable demand.
    #[clap(long = "precio-capacidad")]
    precio_capacidad: Option<KilowattRate>,

    /// Distribution price, pesos per kilowatt.
    #[clap(long = "precio-distribucion")]
    precio_distribucion: Option<KilowattRate>,

    /// Fixed monthly charge, pesos.
    #[clap(long = "cargo-fijo")]
    cargo_fijo: Option<Cost>,

    /// Include the public lighting levy («DAP»).
    #[clap(long = "incluir-dap")]
    incluir_dap: Option<bool>,

    /// Public lighting levy, percent of the subtotal.
    #[clap(long = "porcentaje-dap")]
    porcentaje_dap: Option<Percent>,

    /// Price the distribution charge on the load-factor demand with this factor, for example 0.57.
    #[clap(long = "factor-carga")]
    factor_carga: Option<f64>,
}

impl From<&PriceArgs> for PriceOverrides {
    fn from(args: &PriceArgs) -> Self {
        Self {
            precio_base: args.precio_base,
            precio_intermedio: args.precio_intermedio,
            precio_punta: args.precio_punta,
            precio_capacidad: args.precio_capacidad,
            precio_distribucion: args.precio_distribucion,
            cargo_fijo: args.cargo_fijo,
            incluir_dap: args.incluir_dap,
            porcentaje_dap: args.porcentaje_dap,
            demanda_distribucion: args
                .factor_carga
                .map(|factor| DistributionDemand::LoadFactor { factor }),
        }
    }
}

#[derive(Parser)]
pub struct PricesArgs {
    #[clap(flatten)]
    settings: SettingsArgs,

    /// Print JSON instead of a table.
    #[clap(long)]
    json: bool,
}

impl PricesArgs {
    pub fn run(self) -> Result {
        let prices = self.settings.load()?.default_prices();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&prices)?);
        } else {
            println!("{}", build_prices_table(&prices));
        }
        Ok(())
    }
}
