//! Lenient field deserializers shared by the source records and [`Listing`].
//!
//! Raw marketplace dumps are inconsistent about whether prices and unit labels
//! arrive as JSON numbers or strings, and about null versus absent keys.
//! These helpers accept the shapes seen in practice and fail loudly on
//! anything else.
//!
//! [`Listing`]: crate::listing::Listing

use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;
use serde_json::Value;

/// Coerces a price into an integer.
///
/// Accepts integers, floats (truncated toward zero) and strings holding an
/// integer. Anything else is a hard error.
pub fn price<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_price(&value).ok_or_else(|| {
        de::Error::invalid_value(unexpected(&value), &"an integer price or integer string")
    })
}

pub(crate) fn coerce_price(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Optional free text that may have been exported as a number (unit labels).
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::invalid_type(
            unexpected(&other),
            &"a string, number or null",
        )),
    }
}

/// A key that must be present but whose value may be `null`.
///
/// Using `deserialize_with` on an `Option` field switches off serde's
/// "missing means None" behaviour, so an absent key fails the record.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Tells an absent key apart from an explicit `null`.
///
/// Pair with `#[serde(default)]`: a missing key stays `None`, while a present
/// key yields `Some(None)` for `null` and `Some(Some(v))` otherwise.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => Unexpected::Float(f),
            None => Unexpected::Other("number"),
        },
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
