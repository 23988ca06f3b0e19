use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// The storefront runs as a single-currency deployment.
pub const DEFAULT_CURRENCY: &str = "usd";

//--------------------------------------        Cents         ---------------------------------------------------------

/// A monetary amount in minor currency units. All prices, totals and gateway amounts are carried as whole cents;
/// fractional currency never enters the system.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Cents(i64);

op!(binary Cents, Add, add);
op!(binary Cents, Sub, sub);
op!(inplace Cents, SubAssign, sub_assign);
op!(unary Cents, Neg, neg);

impl Mul<i64> for Cents {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Cents {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Cents {}

impl TryFrom<u64> for Cents {
    type Error = CentsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CentsConversionError(format!("Value {value} is too large to convert to Cents")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_formats_as_dollars() {
        assert_eq!(Cents::from(1).to_string(), "$0.01");
        assert_eq!(Cents::from(950).to_string(), "$9.50");
        assert_eq!(Cents::from_dollars(120).to_string(), "$120.00");
        assert_eq!(Cents::from(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn arithmetic() {
        let subtotal = Cents::from(2500) + Cents::from(995);
        assert_eq!(subtotal, Cents::from(3495));
        assert_eq!(subtotal - Cents::from(495), Cents::from(3000));
        assert_eq!(Cents::from(995) * 3, Cents::from(2985));
        assert_eq!(-Cents::from(100), Cents::from(-100));
        let mut balance = Cents::from(1000);
        balance -= Cents::from(250);
        assert_eq!(balance, Cents::from(750));
    }

    #[test]
    fn summing_line_totals() {
        let total: Cents = [Cents::from(2500), Cents::from(995), Cents::from(5)].into_iter().sum();
        assert_eq!(total, Cents::from(3500));
    }

    #[test]
    fn u64_conversion_guards_overflow() {
        assert_eq!(Cents::try_from(1234u64).unwrap(), Cents::from(1234));
        assert!(Cents::try_from(u64::MAX).is_err());
    }
}
