use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Pesos per kilowatt-hour: energy price.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

/// Pesos per kilowatt: capacity and distribution price.
pub type KilowattRate = Quantity<-1, 0, 1>;

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$ {:.4}/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.4}/kWh", self.0)
    }
}

impl Display for KilowattRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$ {:.2}/kW", self.0)
    }
}

impl Debug for KilowattRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}/kW", self.0)
    }
}
