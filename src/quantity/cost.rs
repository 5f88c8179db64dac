use std::fmt::{Debug, Display, Formatter};

use crate::quantity::{Quantity, percent::Percent};

/// Mexican pesos.
pub type Cost = Quantity<0, 0, 1>;

impl Cost {
    /// Round the cost to centavos.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        self.round_to(2)
    }

    #[must_use]
    pub fn percent(self, percent: Percent) -> Self {
        self * percent.to_proportion()
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$ {:.2}", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.4}", self.0)
    }
}
