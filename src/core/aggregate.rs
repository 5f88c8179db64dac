use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        demand::DemandAnalyzer,
        interval::Interval,
        period::PerPeriod,
        reading::{Convention, Reading},
        schedule::Classify,
    },
    error::{BillingError, Diagnostic},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationMethod {
    /// Hold each power sample until the next one.
    #[default]
    FlatForward,

    /// Interpolate linearly between consecutive power samples.
    Trapezoidal,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrationOptions {
    pub method: IntegrationMethod,

    /// Longer intervals are treated as missing data.
    pub max_gap: Option<TimeDelta>,
}

impl IntegrationOptions {
    #[must_use]
    pub fn is_gap(self, time_delta: TimeDelta) -> bool {
        self.max_gap.is_some_and(|max_gap| time_delta > max_gap)
    }
}

/// Per-period energy and peak demand over a series of readings.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Aggregation {
    pub energy: PerPeriod<KilowattHours>,
    pub peak_demand: PerPeriod<Kilowatts>,

    /// From the first to the last reading.
    pub span: Interval,

    pub diagnostics: Vec<Diagnostic>,
}

impl Aggregation {
    #[must_use]
    pub fn total_energy(&self) -> KilowattHours {
        self.energy.base + self.energy.intermedio + self.energy.punta
    }

    #[must_use]
    pub fn billable_demand(&self) -> Kilowatts {
        self.peak_demand.billable()
    }

    /// Length of the covered span in fractional days.
    #[must_use]
    pub fn days(&self) -> f64 {
        self.span.duration().as_seconds_f64() / SECONDS_PER_DAY
    }

    /// Combine partial aggregations of adjacent sub-windows.
    pub fn merge(mut self, other: Self) -> Self {
        self.diagnostics.extend(other.diagnostics);
        Self {
            energy: self.energy.zip_with(other.energy, |lhs, rhs| lhs + rhs),
            peak_demand: self.peak_demand.zip_with(other.peak_demand, Kilowatts::max),
            span: self.span.union(other.span),
            diagnostics: self.diagnostics,
        }
    }
}

/// Energy per tariff period as a single left fold over time-ordered readings.
pub struct Aggregator<'a, C> {
    classifier: &'a C,
    convention: Convention,
    options: IntegrationOptions,
    demand: DemandAnalyzer<'a, C>,
    energy: PerPeriod<KilowattHours>,
    first: Option<Reading>,
    previous: Option<Reading>,
    n_readings: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, C: Classify> Aggregator<'a, C> {
    pub fn new(classifier: &'a C, convention: Convention, options: IntegrationOptions) -> Self {
        Self {
            classifier,
            convention,
            options,
            demand: DemandAnalyzer::new(classifier, convention, options),
            energy: PerPeriod::default(),
            first: None,
            previous: None,
            n_readings: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if let Some(previous) = self.previous {
            if reading.timestamp <= previous.timestamp {
                self.report(Diagnostic::OutOfOrder { at: reading.timestamp });
                return;
            }
            self.integrate(previous, reading);
        } else {
            self.first = Some(reading);
        }
        self.demand.push(reading);
        self.previous = Some(reading);
        self.n_readings += 1;
    }

    fn integrate(&mut self, from: Reading, to: Reading) {
        if self.options.is_gap(to.timestamp - from.timestamp) {
            self.report(Diagnostic::Gap { from: from.timestamp, to: to.timestamp });
            return;
        }
        match self.convention {
            Convention::Power => {
                let mut cursor = from.timestamp;
                while cursor < to.timestamp {
                    let period = self.classifier.classify(cursor);
                    let until = self.classifier.next_boundary(cursor).min(to.timestamp);
                    let energy = self.segment_energy(from, to, cursor, until);
                    self.energy[period] += energy;
                    cursor = until;
                }
            }
            Convention::Counter => {
                let delta = to.value - from.value;
                if delta < 0.0 {
                    self.report(Diagnostic::CounterReset { at: to.timestamp, delta });
                } else {
                    let period = self.classifier.classify(from.timestamp);
                    self.energy[period] += KilowattHours::from(delta);
                }
            }
        }
    }

    fn segment_energy(
        &self,
        from: Reading,
        to: Reading,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> KilowattHours {
        let power = match self.options.method {
            IntegrationMethod::FlatForward => Kilowatts::from(from.value),
            IntegrationMethod::Trapezoidal => {
                (interpolate(from, to, start) + interpolate(from, to, end)) / 2.0
            }
        };
        power * (end - start)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "reading anomaly");
        self.diagnostics.push(diagnostic);
    }

    pub fn finish(self) -> Result<Aggregation, BillingError> {
        match (self.first, self.previous) {
            (Some(first), Some(last)) if self.n_readings >= 2 => Ok(Aggregation {
                energy: self.energy,
                peak_demand: self.demand.finish(),
                span: Interval::new(first.timestamp, last.timestamp),
                diagnostics: self.diagnostics,
            }),
            _ => Err(BillingError::InsufficientData { n_readings: self.n_readings }),
        }
    }
}

fn interpolate(from: Reading, to: Reading, at: DateTime<Utc>) -> Kilowatts {
    let ratio = (at - from.timestamp).as_seconds_f64()
        / (to.timestamp - from.timestamp).as_seconds_f64();
    Kilowatts::from((to.value - from.value).mul_add(ratio, from.value))
}

#[instrument(skip_all, fields(convention = ?convention))]
pub fn aggregate<C: Classify>(
    readings: impl IntoIterator<Item = Reading>,
    classifier: &C,
    convention: Convention,
    options: IntegrationOptions,
) -> Result<Aggregation, BillingError> {
    let mut aggregator = Aggregator::new(classifier, convention, options);
    for reading in readings {
        aggregator.push(reading);
    }
    let aggregation = aggregator.finish()?;
    debug!(
        base = ?aggregation.energy.base,
        intermedio = ?aggregation.energy.intermedio,
        punta = ?aggregation.energy.punta,
        days = aggregation.days(),
        "aggregated",
    );
    Ok(aggregation)
}
