//! Roughly time-ordered, unique 64-bit ids with a configurable bit layout.
//!
//! Every id packs three fields into a non-negative `i64`, most significant
//! first: milliseconds since a configurable epoch, the generator's node id,
//! and a per-millisecond sequence. Ids from one generator increase
//! monotonically; generators with distinct node ids never collide.
//!
//! ```
//! use snowflake_gen::Generator;
//!
//! let generator = Generator::with_defaults(1).unwrap();
//! let id = generator.next_id().unwrap();
//! assert_eq!(id.to_string().parse::<i64>().unwrap(), id.as_i64());
//! println!("valid until {}", generator.end_at());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "sqlx")]
use sqlx::Type;

pub mod clock;
pub mod defs;
pub mod error;
pub mod generator;
pub mod layout;

#[cfg(feature = "tokio")]
pub mod async_generator;

pub use clock::{Clock, SystemClock};
pub use defs::*;
pub use error::SnowflakeError;
pub use generator::{Generator, IdGenStatus, Options};
pub use layout::{Layout, Parts};

#[cfg(feature = "tokio")]
pub use async_generator::AsyncGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "BIGINT"))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct SnowflakeId(i64);

impl SnowflakeId {
    pub fn new(value: i64) -> Result<Self, SnowflakeError> {
        if value < 0 {
            return Err(SnowflakeError::InvalidId(
                "Snowflake ID cannot be negative".to_string(),
            ));
        }
        Ok(SnowflakeId(value))
    }

    /// Creates a SnowflakeId without validation. Only use this if you're certain the value is valid.
    pub fn new_unchecked(value: i64) -> Self {
        SnowflakeId(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl FromStr for SnowflakeId {
    type Err = SnowflakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<i64>()
            .map_err(|e| SnowflakeError::InvalidId(format!("Failed to parse: {}", e)))?;

        SnowflakeId::new(value)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = SnowflakeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        SnowflakeId::new(value)
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.0
    }
}

// Human-readable formats get a decimal string so JavaScript clients do not
// lose precision above 2^53.
impl Serialize for SnowflakeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.0.to_string())
        } else {
            serializer.serialize_i64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnowflakeIdVisitor;

        impl<'de> serde::de::Visitor<'de> for SnowflakeIdVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake id")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(value)
                    .map(SnowflakeId)
                    .map_err(|_| E::custom("snowflake id value exceeds i64::MAX"))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                SnowflakeId::new(value).map_err(E::custom)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse::<SnowflakeId>().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SnowflakeIdVisitor)
    }
}
