use chrono::{DateTime, Utc};

use crate::{
    core::{
        aggregate::IntegrationOptions,
        period::PerPeriod,
        reading::{Convention, Reading},
        schedule::Classify,
    },
    quantity::{energy::KilowattHours, power::Kilowatts},
};

impl PerPeriod<Kilowatts> {
    /// Highest demand observed in any period, no ratchet against earlier bills.
    #[must_use]
    pub fn billable(&self) -> Kilowatts {
        self.base.max(self.intermedio).max(self.punta)
    }
}

/// Per-period peak demand as a left fold over the readings.
pub struct DemandAnalyzer<'a, C> {
    classifier: &'a C,
    convention: Convention,
    options: IntegrationOptions,
    previous: Option<Reading>,
    peaks: PerPeriod<Kilowatts>,
}

impl<'a, C: Classify> DemandAnalyzer<'a, C> {
    pub fn new(classifier: &'a C, convention: Convention, options: IntegrationOptions) -> Self {
        Self { classifier, convention, options, previous: None, peaks: PerPeriod::default() }
    }

    pub fn push(&mut self, reading: Reading) {
        match self.convention {
            Convention::Power => {
                self.observe(reading.timestamp, Kilowatts::from(reading.value));
            }
            Convention::Counter => {
                // The counter only tells the average power over the interval:
                if let Some(previous) = self.previous {
                    let time_delta = reading.timestamp - previous.timestamp;
                    let delta = reading.value - previous.value;
                    if time_delta.num_milliseconds() > 0
                        && delta >= 0.0
                        && !self.options.is_gap(time_delta)
                    {
                        self.observe(previous.timestamp, KilowattHours::from(delta) / time_delta);
                    }
                }
            }
        }
        self.previous = Some(reading);
    }

    fn observe(&mut self, at: DateTime<Utc>, demand: Kilowatts) {
        let period = self.classifier.classify(at);
        self.peaks[period] = self.peaks[period].max(demand);
    }

    pub fn finish(self) -> PerPeriod<Kilowatts> {
        self.peaks
    }
}

pub fn analyze<C: Classify>(
    readings: impl IntoIterator<Item = Reading>,
    classifier: &C,
    convention: Convention,
    options: IntegrationOptions,
) -> PerPeriod<Kilowatts> {
    let mut analyzer = DemandAnalyzer::new(classifier, convention, options);
    for reading in readings {
        analyzer.push(reading);
    }
    analyzer.finish()
}
