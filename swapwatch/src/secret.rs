use crate::SecretHash;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FromErr {
    #[error("expected {expected} bytes but got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("not a valid hex string")]
    FromHex(#[from] hex::FromHexError),
}

/// The preimage of a [`SecretHash`]; revealing it on-chain claims a swap.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret([u8; Self::LENGTH]);

impl From<[u8; Secret::LENGTH]> for Secret {
    fn from(secret: [u8; Secret::LENGTH]) -> Self {
        Secret(secret)
    }
}

impl Secret {
    pub const LENGTH: usize = 32;

    pub fn from_vec(vec: &[u8]) -> Result<Secret, FromErr> {
        if vec.len() != Self::LENGTH {
            return Err(FromErr::InvalidLength {
                expected: Self::LENGTH,
                got: vec.len(),
            });
        }
        let mut data = [0; Self::LENGTH];
        data.copy_from_slice(vec);

        Ok(Secret(data))
    }

    pub fn hash(&self) -> SecretHash {
        SecretHash::new(*self)
    }

    pub fn as_raw_secret(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn into_raw_secret(self) -> [u8; Self::LENGTH] {
        self.0
    }
}

// Don't leak the secret into logs.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([*****])")
    }
}

impl fmt::LowerHex for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Secret {
    type Err = FromErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vec = hex::decode(s)?;
        Self::from_vec(&vec)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'vde> de::Visitor<'vde> for Visitor {
            type Value = Secret;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a hex encoded 32 byte value")
            }

            fn visit_str<E>(self, v: &str) -> Result<Secret, E>
            where
                E: de::Error,
            {
                Secret::from_str(v).map_err(|_| {
                    de::Error::invalid_value(de::Unexpected::Str(v), &"hex encoded bytes")
                })
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:x}", self))
    }
}
