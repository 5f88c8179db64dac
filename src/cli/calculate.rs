use chrono::NaiveDateTime;
use clap::Parser;

use crate::{
    cli::{SettingsArgs, StoreArgs, prices::PriceArgs, time::parse_local_date_time},
    core::{aggregate::IntegrationMethod, interval::Interval, schedule::TariffSchedule},
    prelude::*,
    service::CalculationRequest,
    store::ClientId,
    tables::{build_bill_table, build_diagnostics_table, build_periods_table},
};

#[derive(Parser)]
pub struct CalculateArgs {
    #[clap(flatten)]
    settings: SettingsArgs,

    #[clap(flatten)]
    store: StoreArgs,

    #[clap(long = "client", env = "CFE_CLIENT")]
    client_id: ClientId,

    /// Start of the billing window, local time.
    #[clap(long = "from", value_parser = parse_local_date_time)]
    from: NaiveDateTime,

    /// End of the billing window, local time, inclusive.
    #[clap(long = "to", value_parser = parse_local_date_time)]
    to: NaiveDateTime,

    /// Sensor column, defaults to the first column of the client.
    #[clap(long)]
    column: Option<String>,

    /// Override the integration method from the settings.
    #[clap(long)]
    method: Option<IntegrationMethod>,

    #[clap(flatten)]
    prices: PriceArgs,

    /// Print JSON instead of tables.
    #[clap(long)]
    json: bool,
}

impl CalculateArgs {
    fn request(&self, schedule: &TariffSchedule) -> CalculationRequest {
        CalculationRequest::builder()
            .client_id(self.client_id)
            .window(Interval::new(schedule.to_utc(self.from), schedule.to_utc(self.to)))
            .maybe_column(self.column.clone())
            .prices((&self.prices).into())
            .build()
    }

    pub fn run(self) -> Result {
        let settings = self.settings.load()?;
        let mut options = settings.integration_options();
        if let Some(method) = self.method {
            options.method = method;
        }
        let calculator = self.store.calculator(&settings, options)?;
        let request = self.request(calculator.schedule());
        let mut calculation = calculator.calculate(&request)?;
        calculation.outcome.result = calculation.outcome.result.rounded();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&calculation)?);
        } else {
            info!(
                client = %calculation.cliente_nombre,
                column = %calculation.columna_sensor,
                days = calculation.outcome.result.dias_periodo,
                "calculated",
            );
            println!("{}", build_periods_table(&calculation.outcome.result, &calculation.prices));
            println!("{}", build_bill_table(&calculation.outcome.result, &calculation.prices));
            if !calculation.outcome.diagnostics.is_empty() {
                println!("{}", build_diagnostics_table(&calculation.outcome.diagnostics));
            }
        }
        Ok(())
    }
}
