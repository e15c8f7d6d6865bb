use crate::Secret;
use bitcoin::hashes::{sha256, Hash};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Debug},
    str::FromStr,
};

/// SHA-256 commitment to a [`Secret`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SecretHash([u8; Self::LENGTH]);

impl SecretHash {
    pub const LENGTH: usize = 32;

    pub fn new(secret: Secret) -> Self {
        let hash = sha256::Hash::hash(secret.as_raw_secret());

        SecretHash(hash.into_inner())
    }

    pub fn as_raw(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn into_raw(self) -> [u8; Self::LENGTH] {
        self.0
    }
}

impl From<[u8; SecretHash::LENGTH]> for SecretHash {
    fn from(hash: [u8; SecretHash::LENGTH]) -> Self {
        SecretHash(hash)
    }
}

impl From<Secret> for SecretHash {
    fn from(secret: Secret) -> Self {
        SecretHash::new(secret)
    }
}

impl Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretHash({:x})", self)
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self)
    }
}

impl fmt::LowerHex for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FromErr {
    #[error("expected {expected} bytes but got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("not a valid hex string")]
    FromHex(#[from] hex::FromHexError),
}

impl FromStr for SecretHash {
    type Err = FromErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vec = hex::decode(s)?;
        if vec.len() != Self::LENGTH {
            return Err(FromErr::InvalidLength {
                expected: Self::LENGTH,
                got: vec.len(),
            });
        }
        let mut data = [0; Self::LENGTH];
        data.copy_from_slice(&vec);

        Ok(SecretHash(data))
    }
}

impl Serialize for SecretHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:x}", self))
    }
}

impl<'de> Deserialize<'de> for SecretHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'vde> de::Visitor<'vde> for Visitor {
            type Value = SecretHash;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a hex encoded 32 byte value")
            }

            fn visit_str<E>(self, v: &str) -> Result<SecretHash, E>
            where
                E: de::Error,
            {
                SecretHash::from_str(v).map_err(|_| {
                    de::Error::invalid_value(de::Unexpected::Str(v), &"hex encoded bytes")
                })
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}
