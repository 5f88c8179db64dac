use std::{fmt::Debug, fs, path::Path};

use chrono::{NaiveDate, TimeDelta};
use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};

use crate::{
    core::{
        aggregate::{IntegrationMethod, IntegrationOptions},
        pricing::{PriceOverrides, PricingConfig},
        schedule::{CENTRAL_MEXICO_UTC_OFFSET, HolidayCalendar, TariffSchedule},
    },
    prelude::*,
};

/// Site-wide defaults, read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Replace the built-in CFE prices.
    pub prices: PriceOverrides,

    pub schedule: ScheduleSettings,
    pub integration: IntegrationSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScheduleSettings {
    /// Local civil time minus UTC.
    pub utc_offset_hours: i64,

    /// Observe the statutory holidays as Sundays.
    pub statutory_holidays: bool,

    /// Additional days observed as Sundays, for example election days.
    pub extra_holidays: Vec<NaiveDate>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: CENTRAL_MEXICO_UTC_OFFSET.num_hours(),
            statutory_holidays: true,
            extra_holidays: Vec::new(),
        }
    }
}

#[serde_as]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IntegrationSettings {
    pub method: IntegrationMethod,

    #[serde_as(as = "Option<DurationSeconds<i64>>")]
    #[serde(rename = "max-gap-seconds")]
    pub max_gap: Option<TimeDelta>,
}

impl Settings {
    /// Read the settings, falling back to the defaults if the file does not exist.
    #[instrument(name = "Reading the settings…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            let settings = Self::from_toml(&contents)
                .with_context(|| format!("failed to parse `{}`", path.display()))?;
            info!("loaded");
            Ok(settings)
        } else {
            info!("not found, using the defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents)?;
        ensure!(
            settings.schedule.utc_offset_hours.abs() <= 14,
            "UTC offset of {} hours is out of range",
            settings.schedule.utc_offset_hours,
        );
        if let Some(max_gap) = settings.integration.max_gap {
            ensure!(max_gap > TimeDelta::zero(), "maximum gap must be positive");
        }
        Ok(settings)
    }

    #[must_use]
    pub fn schedule(&self) -> TariffSchedule {
        let holidays = if self.schedule.statutory_holidays {
            HolidayCalendar::default()
        } else {
            HolidayCalendar::none()
        };
        TariffSchedule::builder()
            .utc_offset(TimeDelta::hours(self.schedule.utc_offset_hours))
            .holidays(holidays.with_extra(self.schedule.extra_holidays.iter().copied()))
            .build()
    }

    #[must_use]
    pub fn default_prices(&self) -> PricingConfig {
        PricingConfig::default().overridden_by(&self.prices)
    }

    #[must_use]
    pub const fn integration_options(&self) -> IntegrationOptions {
        IntegrationOptions { method: self.integration.method, max_gap: self.integration.max_gap }
    }
}
