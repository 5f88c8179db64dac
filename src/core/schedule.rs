//! CFE time-of-use calendar.
//!
//! The default table is the GDMTH schedule for the central region: the «verano» season runs
//! from the first Sunday of April up to the last Sunday of October, and every day is split
//! into `[start, end)` bands that depend on the season and on the day type.

use std::collections::BTreeSet;

use chrono::{
    DateTime,
    Datelike,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    TimeDelta,
    Timelike,
    Utc,
    Weekday,
};

use itertools::Itertools;

use crate::{core::period::TariffPeriod, prelude::*};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Central Mexico, no daylight saving time since 2022.
pub const CENTRAL_MEXICO_UTC_OFFSET: TimeDelta = TimeDelta::hours(-6);

/// Maps instants onto tariff periods.
pub trait Classify {
    fn classify(&self, at: DateTime<Utc>) -> TariffPeriod;

    /// First instant after `at` at which the classification may change.
    fn next_boundary(&self, at: DateTime<Utc>) -> DateTime<Utc>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let year = date.year();
        let start = NaiveDate::from_weekday_of_month_opt(year, 4, Weekday::Sun, 1);
        let end = NaiveDate::from_weekday_of_month_opt(year, 10, Weekday::Sun, 5)
            .or_else(|| NaiveDate::from_weekday_of_month_opt(year, 10, Weekday::Sun, 4));
        match (start, end) {
            (Some(start), Some(end)) if (start..end).contains(&date) => Self::Summer,
            _ => Self::Winter,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DayKind {
    Weekday,
    Saturday,
    SundayOrHoliday,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Holiday {
    Fixed { month: u32, day: u32 },

    /// For example, the third Monday of March.
    NthWeekday { month: u32, weekday: Weekday, n: u32 },
}

impl Holiday {
    #[must_use]
    pub fn falls_on(self, date: NaiveDate) -> bool {
        match self {
            Self::Fixed { month, day } => date.month() == month && date.day() == day,
            Self::NthWeekday { month, weekday, n } => {
                date.month() == month && date.weekday() == weekday && (date.day() - 1) / 7 + 1 == n
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HolidayCalendar {
    rules: Vec<Holiday>,
    extra: BTreeSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    /// Official holidays observed by the CFE tariffs.
    fn default() -> Self {
        Self {
            rules: vec![
                Holiday::Fixed { month: 1, day: 1 },
                Holiday::NthWeekday { month: 2, weekday: Weekday::Mon, n: 1 },
                Holiday::NthWeekday { month: 3, weekday: Weekday::Mon, n: 3 },
                Holiday::Fixed { month: 5, day: 1 },
                Holiday::Fixed { month: 9, day: 16 },
                Holiday::NthWeekday { month: 11, weekday: Weekday::Mon, n: 3 },
                Holiday::Fixed { month: 12, day: 25 },
            ],
            extra: BTreeSet::new(),
        }
    }
}

impl HolidayCalendar {
    #[must_use]
    pub fn none() -> Self {
        Self { rules: Vec::new(), extra: BTreeSet::new() }
    }

    #[must_use]
    pub fn with_extra(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.extra.extend(dates);
        self
    }

    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.extra.contains(&date) || self.rules.iter().any(|rule| rule.falls_on(date))
    }
}

/// Start of a tariff band, the band lasts until the next one starts or until midnight.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Band {
    start_minute: u32,
    period: TariffPeriod,
}

impl Band {
    pub const fn at(hour: u32, period: TariffPeriod) -> Self {
        Self { start_minute: hour * 60, period }
    }

    pub const fn at_minute(minute_of_day: u32, period: TariffPeriod) -> Self {
        Self { start_minute: minute_of_day, period }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DayProfile(Vec<Band>);

impl DayProfile {
    /// The first band must start at midnight and the bands must be strictly ordered.
    pub fn try_new(bands: Vec<Band>) -> Result<Self> {
        ensure!(
            bands.first().is_some_and(|band| band.start_minute == 0),
            "the first band must start at 00:00",
        );
        ensure!(
            bands.iter().tuple_windows().all(|(lhs, rhs)| lhs.start_minute < rhs.start_minute),
            "band starts must be strictly increasing",
        );
        ensure!(
            bands.last().is_some_and(|band| band.start_minute < MINUTES_PER_DAY),
            "bands must start before 24:00",
        );
        Ok(Self(bands))
    }

    #[must_use]
    pub fn flat(period: TariffPeriod) -> Self {
        Self(vec![Band::at(0, period)])
    }

    /// Period at the minute of the day and the minute at which its band ends.
    fn band_at(&self, minute_of_day: u32) -> (TariffPeriod, u32) {
        let index = self.0.partition_point(|band| band.start_minute <= minute_of_day);
        let period = self.0[index.saturating_sub(1)].period;
        let end = self.0.get(index).map_or(MINUTES_PER_DAY, |band| band.start_minute);
        (period, end)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeasonProfile {
    pub weekday: DayProfile,
    pub saturday: DayProfile,
    pub sunday_or_holiday: DayProfile,
}

impl SeasonProfile {
    #[must_use]
    pub fn gdmth_summer() -> Self {
        use TariffPeriod::{Base, Intermedio, Punta};
        Self {
            weekday: DayProfile(vec![
                Band::at(0, Base),
                Band::at(6, Intermedio),
                Band::at(20, Punta),
                Band::at(22, Intermedio),
            ]),
            saturday: DayProfile(vec![Band::at(0, Base), Band::at(7, Intermedio)]),
            sunday_or_holiday: DayProfile(vec![Band::at(0, Base), Band::at(19, Intermedio)]),
        }
    }

    #[must_use]
    pub fn gdmth_winter() -> Self {
        use TariffPeriod::{Base, Intermedio, Punta};
        Self {
            weekday: DayProfile(vec![
                Band::at(0, Base),
                Band::at(6, Intermedio),
                Band::at(18, Punta),
                Band::at(22, Intermedio),
            ]),
            saturday: DayProfile(vec![
                Band::at(0, Base),
                Band::at(8, Intermedio),
                Band::at(19, Punta),
                Band::at(21, Intermedio),
            ]),
            sunday_or_holiday: DayProfile(vec![Band::at(0, Base), Band::at(18, Intermedio)]),
        }
    }

    /// Same profile for every day type.
    #[must_use]
    pub fn uniform(profile: DayProfile) -> Self {
        Self { weekday: profile.clone(), saturday: profile.clone(), sunday_or_holiday: profile }
    }

    fn day(&self, kind: DayKind) -> &DayProfile {
        match kind {
            DayKind::Weekday => &self.weekday,
            DayKind::Saturday => &self.saturday,
            DayKind::SundayOrHoliday => &self.sunday_or_holiday,
        }
    }
}

#[derive(Clone, Debug, bon::Builder)]
pub struct TariffSchedule {
    /// Local civil time minus UTC.
    #[builder(default = CENTRAL_MEXICO_UTC_OFFSET)]
    utc_offset: TimeDelta,

    #[builder(default = SeasonProfile::gdmth_summer())]
    summer: SeasonProfile,

    #[builder(default = SeasonProfile::gdmth_winter())]
    winter: SeasonProfile,

    #[builder(default)]
    holidays: HolidayCalendar,
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TariffSchedule {
    #[must_use]
    pub const fn utc_offset(&self) -> TimeDelta {
        self.utc_offset
    }

    /// Saturates at the ends of the representable range.
    #[must_use]
    pub fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        shift(at.naive_utc(), self.utc_offset)
    }

    /// Saturates at the ends of the representable range.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        shift(local, -self.utc_offset).and_utc()
    }

    #[must_use]
    pub fn day_kind(&self, date: NaiveDate) -> DayKind {
        if date.weekday() == Weekday::Sun || self.holidays.is_holiday(date) {
            DayKind::SundayOrHoliday
        } else if date.weekday() == Weekday::Sat {
            DayKind::Saturday
        } else {
            DayKind::Weekday
        }
    }

    fn day_profile(&self, date: NaiveDate) -> &DayProfile {
        let season = match Season::of(date) {
            Season::Summer => &self.summer,
            Season::Winter => &self.winter,
        };
        season.day(self.day_kind(date))
    }
}

fn shift(at: NaiveDateTime, delta: TimeDelta) -> NaiveDateTime {
    at.checked_add_signed(delta).unwrap_or(if delta < TimeDelta::zero() {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    })
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

impl Classify for TariffSchedule {
    fn classify(&self, at: DateTime<Utc>) -> TariffPeriod {
        let local = self.to_local(at);
        self.day_profile(local.date()).band_at(minute_of_day(local.time())).0
    }

    fn next_boundary(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let local = self.to_local(at);
        let (_, end_minute) = self.day_profile(local.date()).band_at(minute_of_day(local.time()));
        let midnight = local.date().and_time(NaiveTime::MIN);
        self.to_utc(shift(midnight, TimeDelta::minutes(i64::from(end_minute))))
    }
}

#[cfg(test)]
mod tests {
    use TariffPeriod::{Base, Intermedio, Punta};

    use super::*;

    fn local(schedule: &TariffSchedule, date: &str, hour: u32, minute: u32) -> DateTime<Utc> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        schedule.to_utc(date.and_hms_opt(hour, minute, 0).unwrap())
    }

    fn classify(date: &str, hour: u32, minute: u32) -> TariffPeriod {
        let schedule = TariffSchedule::default();
        schedule.classify(local(&schedule, date, hour, minute))
    }

    #[test]
    fn test_winter_weekday() {
        // Wednesday:
        assert_eq!(classify("2025-01-15", 5, 59), Base);
        assert_eq!(classify("2025-01-15", 6, 0), Intermedio);
        assert_eq!(classify("2025-01-15", 17, 59), Intermedio);
        assert_eq!(classify("2025-01-15", 18, 0), Punta);
        assert_eq!(classify("2025-01-15", 21, 59), Punta);
        assert_eq!(classify("2025-01-15", 22, 0), Intermedio);
        assert_eq!(classify("2025-01-15", 23, 59), Intermedio);
    }

    #[test]
    fn test_summer_weekday() {
        assert_eq!(classify("2025-07-16", 0, 0), Base);
        assert_eq!(classify("2025-07-16", 19, 59), Intermedio);
        assert_eq!(classify("2025-07-16", 20, 0), Punta);
        assert_eq!(classify("2025-07-16", 22, 0), Intermedio);
    }

    #[test]
    fn test_winter_weekend() {
        assert_eq!(classify("2025-01-18", 7, 59), Base);
        assert_eq!(classify("2025-01-18", 8, 0), Intermedio);
        assert_eq!(classify("2025-01-18", 19, 0), Punta);
        assert_eq!(classify("2025-01-18", 21, 0), Intermedio);
        assert_eq!(classify("2025-01-19", 17, 59), Base);
        assert_eq!(classify("2025-01-19", 18, 0), Intermedio);
    }

    #[test]
    fn test_holiday_follows_sunday_profile() {
        // First Monday of February:
        assert_eq!(classify("2025-02-03", 19, 0), Intermedio);
        assert_eq!(classify("2025-02-10", 19, 0), Punta);
        // Christmas on a Thursday:
        assert_eq!(classify("2025-12-25", 19, 0), Intermedio);
    }

    #[test]
    fn test_extra_holiday() {
        let extra = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let holidays = HolidayCalendar::default().with_extra([extra]);
        let schedule = TariffSchedule::builder().holidays(holidays).build();
        assert_eq!(schedule.classify(local(&schedule, "2025-01-15", 19, 0)), Intermedio);
        assert_eq!(schedule.classify(local(&schedule, "2025-01-16", 19, 0)), Punta);
    }

    #[test]
    fn test_custom_weekends() {
        let weekends = |profile: SeasonProfile| SeasonProfile {
            saturday: DayProfile::flat(Base),
            sunday_or_holiday: DayProfile::flat(Base),
            ..profile
        };
        let schedule = TariffSchedule::builder()
            .summer(weekends(SeasonProfile::gdmth_summer()))
            .winter(weekends(SeasonProfile::gdmth_winter()))
            .build();
        assert_eq!(schedule.classify(local(&schedule, "2025-01-18", 19, 30)), Base);
        assert_eq!(schedule.classify(local(&schedule, "2025-01-19", 20, 0)), Base);
        assert_eq!(schedule.classify(local(&schedule, "2025-01-17", 19, 30)), Punta);
        assert_eq!(
            schedule.next_boundary(local(&schedule, "2025-01-18", 10, 0)),
            local(&schedule, "2025-01-19", 0, 0),
        );
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(Season::of(NaiveDate::from_ymd_opt(2025, 4, 5).unwrap()), Season::Winter);
        assert_eq!(Season::of(NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()), Season::Summer);
        assert_eq!(Season::of(NaiveDate::from_ymd_opt(2025, 10, 25).unwrap()), Season::Summer);
        assert_eq!(Season::of(NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()), Season::Winter);

        // Saturday morning is Base in winter and Intermedio in summer:
        assert_eq!(classify("2025-04-05", 7, 30), Base);
        assert_eq!(classify("2025-10-25", 7, 30), Intermedio);
        // Sunday evening is Base in summer and Intermedio in winter:
        assert_eq!(classify("2025-04-06", 18, 30), Base);
        assert_eq!(classify("2025-10-26", 18, 30), Intermedio);
    }

    #[test]
    fn test_classify_uses_local_time() {
        // 00:30 UTC is 18:30 of the previous day in central Mexico:
        let at =
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap().and_hms_opt(0, 30, 0).unwrap().and_utc();
        assert_eq!(TariffSchedule::default().classify(at), Punta);
    }

    #[test]
    fn test_next_boundary() {
        let schedule = TariffSchedule::default();
        assert_eq!(
            schedule.next_boundary(local(&schedule, "2025-01-15", 10, 15)),
            local(&schedule, "2025-01-15", 18, 0),
        );
        assert_eq!(
            schedule.next_boundary(local(&schedule, "2025-01-15", 18, 0)),
            local(&schedule, "2025-01-15", 22, 0),
        );
        assert_eq!(
            schedule.next_boundary(local(&schedule, "2025-01-15", 23, 0)),
            local(&schedule, "2025-01-16", 0, 0),
        );
    }

    #[test]
    fn test_total_and_consistent_over_a_year() {
        let schedule = TariffSchedule::default();
        let mut at = local(&schedule, "2025-01-01", 0, 0);
        let end = local(&schedule, "2026-01-01", 0, 0);
        while at < end {
            let boundary = schedule.next_boundary(at);
            assert!(boundary > at);
            // The period holds until the boundary:
            assert_eq!(schedule.classify(boundary - TimeDelta::seconds(1)), schedule.classify(at));
            at += TimeDelta::minutes(7);
        }
    }

    #[test]
    fn test_day_profile_validation() {
        assert!(DayProfile::try_new(vec![Band::at(1, Base)]).is_err());
        assert!(DayProfile::try_new(vec![Band::at(0, Base), Band::at(0, Punta)]).is_err());
        assert!(DayProfile::try_new(vec![Band::at(0, Base), Band::at(24, Punta)]).is_err());
        assert!(DayProfile::try_new(vec![Band::at(0, Base), Band::at_minute(90, Punta)]).is_ok());
    }

    #[test]
    fn test_range_ends_do_not_overflow() {
        let schedule = TariffSchedule::default();
        for at in [DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC] {
            let _ = schedule.classify(at);
            assert!(schedule.next_boundary(at) >= at);
        }
        assert_eq!(schedule.to_utc(NaiveDateTime::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(schedule.to_local(DateTime::<Utc>::MIN_UTC), NaiveDateTime::MIN);
    }
}
