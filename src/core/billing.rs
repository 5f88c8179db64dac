use serde::Serialize;

use crate::{
    core::{
        aggregate::{IntegrationOptions, aggregate},
        bill::BillingResult,
        interval::Interval,
        pricing::{PricingConfig, price},
        reading::{Convention, Reading},
        schedule::Classify,
    },
    error::{BillingError, Diagnostic},
    prelude::*,
};

/// Successful computation together with its non-fatal findings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingOutcome {
    #[serde(rename = "resultado")]
    pub result: BillingResult,

    pub diagnostics: Vec<Diagnostic>,
}

/// One bill computation for a single sensor column over a billing window.
#[derive(bon::Builder)]
pub struct Billing<'a, C> {
    classifier: &'a C,
    config: &'a PricingConfig,

    /// Closed billing window: readings at both ends are included.
    window: Interval,

    column: &'a str,
    available_columns: &'a [String],

    #[builder(default)]
    convention: Convention,

    #[builder(default)]
    options: IntegrationOptions,
}

impl<C: Classify> Billing<'_, C> {
    /// Validate the inputs and compute the bill.
    ///
    /// The readings may be a superset of the window, only those inside it are used.
    #[instrument(skip_all, fields(window = %self.window, column = self.column))]
    pub fn compute(
        &self,
        readings: impl IntoIterator<Item = Reading>,
    ) -> Result<BillingOutcome, BillingError> {
        validate_window(self.window)?;
        if !self.available_columns.iter().any(|column| column == self.column) {
            return Err(BillingError::UnknownColumn { column: self.column.to_owned() });
        }
        self.config.validate()?;

        let window = self.window;
        let aggregation = aggregate(
            readings.into_iter().filter(|reading| window.includes(reading.timestamp)),
            self.classifier,
            self.convention,
            self.options,
        )?;
        let result = price(&aggregation, self.config);
        info!(total = %result.total, days = result.dias_periodo, "computed");
        Ok(BillingOutcome { result, diagnostics: aggregation.diagnostics })
    }
}

pub fn validate_window(window: Interval) -> Result<(), BillingError> {
    if window.is_empty() {
        Err(BillingError::InvalidWindow { window, reason: "the start must precede the end" })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

    use super::*;
    use crate::{
        core::{
            period::TariffPeriod::{Base, Intermedio, Punta},
            schedule::{Band, DayProfile, HolidayCalendar, SeasonProfile, TariffSchedule},
        },
        quantity::{
            cost::Cost,
            power::Kilowatts,
            rate::{KilowattHourRate, KilowattRate},
        },
    };

    fn schedule() -> TariffSchedule {
        let day = DayProfile::try_new(vec![
            Band::at(0, Base),
            Band::at(6, Intermedio),
            Band::at(18, Punta),
            Band::at(20, Base),
        ])
        .unwrap();
        TariffSchedule::builder()
            .summer(SeasonProfile::uniform(day.clone()))
            .winter(SeasonProfile::uniform(day))
            .holidays(HolidayCalendar::none())
            .build()
    }

    fn config() -> PricingConfig {
        PricingConfig {
            precio_base: KilowattHourRate::from(1.0),
            precio_intermedio: KilowattHourRate::from(1.5),
            precio_punta: KilowattHourRate::from(3.0),
            precio_capacidad: KilowattRate::from(50.0),
            precio_distribucion: KilowattRate::from(20.0),
            cargo_fijo: Cost::from(500.0),
            incluir_dap: false,
            ..PricingConfig::default()
        }
    }

    fn start(schedule: &TariffSchedule) -> DateTime<Utc> {
        // Winter Wednesday:
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        schedule.to_utc(date.and_hms_opt(0, 0, 0).unwrap())
    }

    /// Constant 10 kW every 15 minutes, with a day of margin on each side.
    fn readings(schedule: &TariffSchedule) -> Vec<Reading> {
        let start = start(schedule) - TimeDelta::days(1);
        (0..=288).map(|i| Reading::new(start + TimeDelta::minutes(15 * i), 10.0)).collect()
    }

    fn columns() -> Vec<String> {
        vec!["grid".to_owned(), "solar".to_owned()]
    }

    #[test]
    fn test_worked_example() {
        let schedule = schedule();
        let config = config();
        let columns = columns();
        let start = start(&schedule);
        let outcome = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(Interval::new(start, start + TimeDelta::days(1)))
            .column("grid")
            .available_columns(&columns)
            .build()
            .compute(readings(&schedule))
            .unwrap();
        let result = outcome.result;
        assert_abs_diff_eq!(result.kwh_base.0, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.kwh_intermedio.0, 120.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.kwh_punta.0, 20.0, epsilon = 1e-9);
        assert_eq!(result.demanda_facturable, Kilowatts::from(10.0));
        assert_abs_diff_eq!(result.energia.0, 1040.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.subtotal.0, 1540.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.iva.0, 246.4, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total.0, 1786.4, epsilon = 1e-9);
        assert_abs_diff_eq!(result.rounded().total.0, 1786.4);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let schedule = schedule();
        let config = PricingConfig::default();
        let columns = columns();
        let start = start(&schedule);
        let billing = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(Interval::new(start, start + TimeDelta::hours(30)))
            .column("solar")
            .available_columns(&columns)
            .build();
        assert_eq!(billing.compute(readings(&schedule)), billing.compute(readings(&schedule)));
    }

    #[test]
    fn test_invalid_window() {
        let schedule = schedule();
        let config = config();
        let columns = columns();
        let start = start(&schedule);
        let window = Interval::new(start, start);
        let result = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(window)
            .column("grid")
            .available_columns(&columns)
            .build()
            .compute(readings(&schedule));
        assert!(matches!(result, Err(BillingError::InvalidWindow { .. })));
    }

    #[test]
    fn test_unknown_column_precedes_price_validation() {
        let schedule = schedule();
        let config = PricingConfig { precio_base: KilowattHourRate::from(-1.0), ..config() };
        let columns = columns();
        let start = start(&schedule);
        let billing = |column: &'static str| {
            Billing::builder()
                .classifier(&schedule)
                .config(&config)
                .window(Interval::new(start, start + TimeDelta::days(1)))
                .column(column)
                .available_columns(&columns)
                .build()
        };
        assert_eq!(
            billing("battery").compute(readings(&schedule)),
            Err(BillingError::UnknownColumn { column: "battery".to_owned() }),
        );
        assert_eq!(
            billing("grid").compute(readings(&schedule)),
            Err(BillingError::InvalidPriceConfig { field: "precioBase", value: -1.0 }),
        );
    }

    #[test]
    fn test_insufficient_data_in_window() {
        let schedule = schedule();
        let config = config();
        let columns = columns();
        let start = start(&schedule);
        let result = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(Interval::new(start + TimeDelta::minutes(1), start + TimeDelta::minutes(16)))
            .column("grid")
            .available_columns(&columns)
            .build()
            .compute(readings(&schedule));
        assert_eq!(result, Err(BillingError::InsufficientData { n_readings: 1 }));
    }

    #[test]
    fn test_billable_demand_is_max_of_peaks() {
        let schedule = schedule();
        let config = config();
        let columns = columns();
        let start = start(&schedule);
        let readings = (0..=96).map(|i| {
            let value = if (70..75).contains(&i) { 25.0 } else { 5.0 + f64::from(i % 7) };
            Reading::new(start + TimeDelta::minutes(15 * i64::from(i)), value)
        });
        let result = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(Interval::new(start, start + TimeDelta::days(1)))
            .column("grid")
            .available_columns(&columns)
            .build()
            .compute(readings)
            .unwrap()
            .result;
        assert_eq!(
            result.demanda_facturable,
            result.max_base.max(result.max_intermedio).max(result.max_punta),
        );
        // 17:30–18:45 straddles Intermedio and Punta:
        assert_eq!(result.max_intermedio, Kilowatts::from(25.0));
        assert_eq!(result.max_punta, Kilowatts::from(25.0));
        assert!(result.total >= result.subtotal);
    }

    #[test]
    fn test_exporting_column_bills_fixed_charge_only() {
        let schedule = schedule();
        let config = PricingConfig::default();
        let columns = columns();
        let start = start(&schedule);
        let readings = (0..=96)
            .map(|i| Reading::new(start + TimeDelta::minutes(15 * i), -10.0))
            .collect::<Vec<_>>();
        let result = Billing::builder()
            .classifier(&schedule)
            .config(&config)
            .window(Interval::new(start, start + TimeDelta::days(1)))
            .column("grid")
            .available_columns(&columns)
            .build()
            .compute(readings)
            .unwrap()
            .result;
        assert_eq!(result.costo_base, Cost::ZERO);
        assert_eq!(result.energia, Cost::ZERO);
        assert_eq!(result.subtotal, config.cargo_fijo);
        assert!(result.iva >= Cost::ZERO);
        assert!(result.total >= result.subtotal);
    }
}
