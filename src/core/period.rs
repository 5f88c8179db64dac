use std::{
    fmt::{Display, Formatter},
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

/// CFE time-of-use period.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TariffPeriod {
    Base,
    Intermedio,
    Punta,
}

impl TariffPeriod {
    pub const ALL: [Self; 3] = [Self::Base, Self::Intermedio, Self::Punta];
}

impl Display for TariffPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "Base"),
            Self::Intermedio => write!(f, "Intermedio"),
            Self::Punta => write!(f, "Punta"),
        }
    }
}

/// One value per tariff period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct PerPeriod<T> {
    pub base: T,
    pub intermedio: T,
    pub punta: T,
}

impl<T> PerPeriod<T> {
    pub fn iter(&self) -> impl Iterator<Item = (TariffPeriod, &T)> {
        TariffPeriod::ALL.into_iter().map(move |period| (period, &self[period]))
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> PerPeriod<U> {
        PerPeriod { base: f(self.base), intermedio: f(self.intermedio), punta: f(self.punta) }
    }

    /// Combine two partial results period by period.
    pub fn zip_with(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        Self {
            base: f(self.base, other.base),
            intermedio: f(self.intermedio, other.intermedio),
            punta: f(self.punta, other.punta),
        }
    }
}

impl<T> Index<TariffPeriod> for PerPeriod<T> {
    type Output = T;

    fn index(&self, period: TariffPeriod) -> &Self::Output {
        match period {
            TariffPeriod::Base => &self.base,
            TariffPeriod::Intermedio => &self.intermedio,
            TariffPeriod::Punta => &self.punta,
        }
    }
}

impl<T> IndexMut<TariffPeriod> for PerPeriod<T> {
    fn index_mut(&mut self, period: TariffPeriod) -> &mut Self::Output {
        match period {
            TariffPeriod::Base => &mut self.base,
            TariffPeriod::Intermedio => &mut self.intermedio,
            TariffPeriod::Punta => &mut self.punta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        let mut values = PerPeriod::<u32>::default();
        values[TariffPeriod::Punta] += 5;
        assert_eq!(values.punta, 5);
        assert_eq!(values[TariffPeriod::Base], 0);
    }

    #[test]
    fn test_zip_with() {
        let lhs = PerPeriod { base: 1, intermedio: 5, punta: 2 };
        let rhs = PerPeriod { base: 3, intermedio: 4, punta: 2 };
        assert_eq!(lhs.zip_with(rhs, u32::max), PerPeriod { base: 3, intermedio: 5, punta: 2 });
    }

    #[test]
    fn test_map() {
        let values = PerPeriod { base: -1, intermedio: 5, punta: 0 };
        assert_eq!(values.map(|value| value.max(0)), PerPeriod { base: 0, intermedio: 5, punta: 0 });
    }
}
