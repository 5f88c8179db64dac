use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(
    Copy,
    Clone,
    Default,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    pub const fn to_proportion(self) -> f64 {
        0.01 * self.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
