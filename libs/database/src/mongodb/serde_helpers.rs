//! Timestamp encoding that works for both BSON and JSON.
//!
//! `chrono` always serializes as an RFC 3339 string, which breaks `$lt`/`$gte`
//! comparisons in Mongo. These helpers write a BSON date when the serializer is
//! binary and the usual string for JSON, and read either form back.
//!
//! ```ignore
//! #[serde(with = "database::mongodb::serde_helpers::datetime")]
//! pub created_at: DateTime<Utc>,
//! ```

use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{self, Bson};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn from_bson<E: serde::de::Error>(value: Bson) -> Result<DateTime<Utc>, E> {
    match value {
        Bson::DateTime(dt) => Utc
            .timestamp_millis_opt(dt.timestamp_millis())
            .single()
            .ok_or_else(|| E::custom("date out of range")),
        Bson::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(E::custom),
        other => Err(E::custom(format!(
            "expected a date, found {:?}",
            other.element_type()
        ))),
    }
}

/// Convert a timestamp into a value usable inside `doc!` filters.
pub fn to_bson_date(value: &DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(value.timestamp_millis()))
}

pub mod datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            value.serialize(serializer)
        } else {
            bson::DateTime::from_millis(value.timestamp_millis()).serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        from_bson(Bson::deserialize(deserializer)?)
    }
}

pub mod option_datetime {
    use super::*;

    struct Wrapped<'a>(&'a DateTime<Utc>);

    impl Serialize for Wrapped<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            datetime::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&Wrapped(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Bson>::deserialize(deserializer)? {
            None | Some(Bson::Null) => Ok(None),
            Some(value) => from_bson(value).map(Some),
        }
    }
}
