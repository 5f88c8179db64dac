use serde::Serialize;

use crate::{
    core::{
        aggregate::IntegrationOptions,
        billing::{Billing, BillingOutcome, validate_window},
        interval::Interval,
        pricing::{PriceOverrides, PricingConfig},
        schedule::TariffSchedule,
    },
    error::BillingError,
    prelude::*,
    store::{ClientId, ReadingSource},
};

#[derive(Clone, Debug, bon::Builder)]
pub struct CalculationRequest {
    pub client_id: ClientId,
    pub window: Interval,

    /// Defaults to the first column of the client.
    #[builder(into)]
    pub column: Option<String>,

    pub prices: Option<PriceOverrides>,
}

/// Bill of one client's column, as presented to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub cliente_nombre: String,
    pub columna_sensor: String,

    #[serde(rename = "periodo")]
    pub window: Interval,

    #[serde(rename = "precios")]
    pub prices: PricingConfig,

    #[serde(flatten)]
    pub outcome: BillingOutcome,
}

/// Caller-facing bill calculator over a reading store.
#[derive(bon::Builder)]
pub struct Calculator<S> {
    store: S,

    #[builder(default)]
    schedule: TariffSchedule,

    #[builder(default)]
    default_prices: PricingConfig,

    #[builder(default)]
    options: IntegrationOptions,
}

impl<S: ReadingSource> Calculator<S> {
    #[must_use]
    pub const fn default_prices(&self) -> &PricingConfig {
        &self.default_prices
    }

    #[must_use]
    pub const fn schedule(&self) -> &TariffSchedule {
        &self.schedule
    }

    pub fn columns(&self, client_id: ClientId) -> Result<Vec<String>, BillingError> {
        self.store.client(client_id).ok_or(BillingError::UnknownClient(client_id))?;
        Ok(self.store.columns(client_id))
    }

    #[instrument(skip_all, fields(client_id = %request.client_id))]
    pub fn calculate(&self, request: &CalculationRequest) -> Result<Calculation, BillingError> {
        let client_id = request.client_id;
        let client = self.store.client(client_id).ok_or(BillingError::UnknownClient(client_id))?;
        validate_window(request.window)?;

        let columns = self.store.columns(client_id);
        let Some(first_column) = columns.first() else {
            return Err(BillingError::NoColumns(client_id));
        };
        let column = request.column.clone().unwrap_or_else(|| first_column.clone());
        if let Some(data_range) = self.store.data_range(client_id, &column)
            && !data_range.overlaps(request.window)
        {
            return Err(BillingError::InvalidWindow {
                window: request.window,
                reason: "the column has no readings in the window",
            });
        }

        let prices = request
            .prices
            .map_or(self.default_prices, |overrides| self.default_prices.overridden_by(&overrides));
        let series = self.store.series(client_id, &column, request.window).unwrap_or_default();
        info!(
            client = %client.name,
            column = %column,
            convention = ?series.convention,
            n_readings = series.readings.len(),
            "calculating…",
        );
        let outcome = Billing::builder()
            .classifier(&self.schedule)
            .config(&prices)
            .window(request.window)
            .column(&column)
            .available_columns(&columns)
            .convention(series.convention)
            .options(self.options)
            .build()
            .compute(series.readings)?;

        Ok(Calculation {
            cliente_nombre: client.name,
            columna_sensor: column,
            window: request.window,
            prices,
            outcome,
        })
    }
}
