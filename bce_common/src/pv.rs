use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::op;

//--------------------------------------        Pv        ------------------------------------------------------------
/// Point volume. Whole sales-credit units used for rank qualification and short-leg matching.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Pv(i64);

op!(binary Pv, Add, add);
op!(binary Pv, Sub, sub);
op!(inplace Pv, AddAssign, add_assign);
op!(inplace Pv, SubAssign, sub_assign);
op!(unary Pv, Neg, neg);

impl From<i64> for Pv {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Pv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} PV", self.0)
    }
}

impl Sum for Pv {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Pv {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// The lesser of the two volumes. The short leg, when comparing leg balances.
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}
