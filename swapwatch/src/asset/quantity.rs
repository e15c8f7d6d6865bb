use num::{BigUint, Num, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, iter::Sum, ops::Add, str::FromStr};

/// An arbitrary-precision, non-negative amount in the smallest unit of a
/// ledger (satoshi, lamport, ...).
#[derive(Debug, Clone, Default, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_dec_str(str: &str) -> Result<Self, num::bigint::ParseBigIntError> {
        let int = BigUint::from_str_radix(str, 10)?;

        Ok(Self(int))
    }

    pub fn to_dec_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for Quantity {
    fn from(int: BigUint) -> Self {
        Self(int)
    }
}

impl From<Quantity> for BigUint {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

macro_rules! impl_from_primitive {
    ($primitive:ty) => {
        impl From<$primitive> for Quantity {
            fn from(value: $primitive) -> Self {
                Quantity(BigUint::from(value))
            }
        }
    };
}

impl_from_primitive!(u8);
impl_from_primitive!(u16);
impl_from_primitive!(u32);
impl_from_primitive!(u64);
impl_from_primitive!(u128);

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Quantity(self.0 + rhs.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = num::bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_dec_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'vde> de::Visitor<'vde> for Visitor {
            type Value = Quantity;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string representing a decimal integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Quantity, E>
            where
                E: de::Error,
            {
                Quantity::from_dec_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}
