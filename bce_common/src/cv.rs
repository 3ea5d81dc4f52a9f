use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::{op, Pv};

/// Number of micro-CV units in one commission-value unit.
pub const MICRO_CV_PER_CV: i64 = 1_000_000;

//--------------------------------------        Cv        ------------------------------------------------------------
/// Commission value. Monetary-equivalent credit, held as fixed-point micro-units on an i64 so that
/// ledger arithmetic never accumulates binary floating-point error.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Cv(i64);

op!(binary Cv, Add, add);
op!(binary Cv, Sub, sub);
op!(inplace Cv, AddAssign, add_assign);
op!(inplace Cv, SubAssign, sub_assign);
op!(unary Cv, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in micro-CV: {0}")]
pub struct CvConversionError(String);

impl From<i64> for Cv {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Cv {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Cv {}

impl TryFrom<u64> for Cv {
    type Error = CvConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CvConversionError(format!("Value {} is too large to convert to Cv", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Cv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cv = self.0 as f64 / MICRO_CV_PER_CV as f64;
        write!(f, "{cv:0.2} CV")
    }
}

impl Sum for Cv {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Cv {
    pub const fn new(micro_cv: i64) -> Self {
        Self(micro_cv)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// The raw micro-CV value.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cv(cv: i64) -> Self {
        Self(cv * MICRO_CV_PER_CV)
    }

    /// Converts a decimal CV amount (e.g. a configured bonus of 50.0) to fixed point,
    /// rounding to the nearest micro-unit.
    pub fn from_cv_f64(cv: f64) -> Self {
        Self((cv * MICRO_CV_PER_CV as f64).round() as i64)
    }

    /// The commission earned on `volume` points at the given rate, e.g. 70 PV at 0.13 is 9.10 CV.
    pub fn from_pv_at_rate(volume: Pv, rate: f64) -> Self {
        Self(((volume.value() * MICRO_CV_PER_CV) as f64 * rate).round() as i64)
    }

    /// Scales this amount by a fractional rate, rounding to the nearest micro-unit.
    pub fn at_rate(self, rate: f64) -> Self {
        Self((self.0 as f64 * rate).round() as i64)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_leg_payout_is_exact() {
        let payout = Cv::from_pv_at_rate(Pv::new(70), 0.13);
        assert_eq!(payout, Cv::from_cv_f64(9.1));
        assert_eq!(payout.value(), 9_100_000);
    }

    #[test]
    fn rate_scaling_rounds_to_micro_units() {
        let base = Cv::from_cv_f64(9.1);
        assert_eq!(base.at_rate(0.05), Cv::new(455_000));
        assert_eq!(Cv::from_cv(13).at_rate(1.0), Cv::from_cv(13));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Cv::from_cv_f64(9.1).to_string(), "9.10 CV");
        assert_eq!(Cv::zero().to_string(), "0.00 CV");
    }
}
