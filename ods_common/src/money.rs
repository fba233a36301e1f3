use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::op;

pub const CENTS_PER_UNIT: f64 = 100.0;

//--------------------------------------        Money         ---------------------------------------------------------
/// A monetary amount in the catalog currency.
///
/// Catalog prices are stored as floating point values (`REAL` columns). Sums are carried at full precision and only
/// rounded to whole cents via [`Money::rounded`] once an aggregate is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(f64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(scalar Money, Mul, mul, u32);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Money> for f64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0.2}", self.0)
    }
}

impl Money {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Applies a percentage tax rate, e.g. `with_tax(2.0)` adds 2%.
    pub fn with_tax(self, tax_percent: f64) -> Self {
        Self(self.0 * (1.0 + tax_percent / 100.0))
    }

    /// Rounds half away from zero to the nearest cent.
    pub fn rounded(self) -> Self {
        Self((self.0 * CENTS_PER_UNIT).round() / CENTS_PER_UNIT)
    }

    pub fn is_valid_price(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}
