//! Wire records for the persisted account document.
//!
//! One document per account lives in the `users` collection:
//!
//! ```text
//! users/{accountId}:
//!   current_user: { ...member fields... }
//!   users: [ { ...member fields... }, ... ]
//! ```
//!
//! Field names here are the compatibility contract with documents already
//! written by the mobile client, so they must not change. Every member field
//! decodes leniently: a field with the wrong type is treated as absent
//! instead of failing the whole document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Collection holding one document per account
pub const USERS_COLLECTION: &str = "users";

/// Blob storage prefix for profile pictures
pub const PROFILE_IMAGES_PREFIX: &str = "profile_images";

/// Content type used for every uploaded profile picture
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Wire field names of the account document and its member entries
pub mod fields {
    pub const CURRENT_USER: &str = "current_user";
    pub const USERS: &str = "users";
    pub const ACCOUNT_ID: &str = "account_id";

    pub const IS_PARENT: &str = "is_parent";
    pub const USER_NAME: &str = "user_name";
    pub const CHALLENGE_TASK: &str = "challenge_task";
    pub const CHALLENGE_POINT: &str = "challenge_point";
    pub const BONUS_POINT: &str = "bonus_point";
    pub const GOAL_POINT: &str = "goal_point";
    pub const CHALLENGE_DAY: &str = "challenge_day";
    pub const HIDDEN_PLACE: &str = "hidden_place";
    pub const PIN: &str = "pin";
    pub const CURRENT_POINT: &str = "current_point";
    pub const PROFILE_IMAGE_URL: &str = "profile_image_url";
    pub const SELECTED_DATES: &str = "selected_dates";
}

/// Blob path of a member's profile picture: `profile_images/{userName}.jpg`
pub fn profile_image_path(user_name: &str) -> String {
    format!("{}/{}.jpg", PROFILE_IMAGES_PREFIX, user_name)
}

/// One member entry as it appears on the wire.
///
/// All fields are optional so that partially written or older documents
/// still decode. Defaults are applied when mapping into the domain model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_parent: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub challenge_task: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub challenge_point: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bonus_point: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub goal_point: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub challenge_day: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hidden_place: Option<String>,
    /// Absent means "no PIN registered"; `0` is a real PIN
    #[serde(default, deserialize_with = "lenient_pin", skip_serializing_if = "Option::is_none")]
    pub pin: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_point: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Calendar days as epoch seconds, flat array
    #[serde(default, deserialize_with = "lenient_timestamps", skip_serializing_if = "Option::is_none")]
    pub selected_dates: Option<Vec<i64>>,
}

/// Envelope of the account document.
///
/// Member entries are kept as raw values so that each one can be decoded on
/// its own: a malformed roster entry is skipped, while a malformed
/// `current_user` fails the fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub users: Option<Vec<Value>>,
    #[serde(default)]
    pub current_user: Option<Value>,
}

impl AccountRecord {
    /// Parse an account document, normalizing remote timestamps first
    pub fn from_document(mut document: Value) -> Result<Self, serde_json::Error> {
        normalize_timestamps(&mut document);
        serde_json::from_value(document)
    }
}

impl MemberRecord {
    /// Parse one member entry, normalizing remote timestamps first
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        normalize_timestamps(&mut value);
        serde_json::from_value(value)
    }

    /// Encode as a JSON object. Absent fields are omitted.
    pub fn to_value(&self) -> Value {
        // Serializing plain options, strings and integers cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Replace remote timestamp objects with ISO-8601 strings.
///
/// The document database hands timestamps back as
/// `{"seconds": .., "nanoseconds": ..}` (or the underscored REST variant).
/// They are rewritten in place so generic decoding only ever sees strings.
pub fn normalize_timestamps(value: &mut Value) {
    if let Value::Object(map) = value {
        if let Some(iso) = timestamp_object_to_iso(map) {
            *value = Value::String(iso);
            return;
        }
    }

    match value {
        Value::Object(map) => map.values_mut().for_each(normalize_timestamps),
        Value::Array(items) => items.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}

fn timestamp_object_to_iso(map: &Map<String, Value>) -> Option<String> {
    if map.len() != 2 {
        return None;
    }
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))?
        .as_i64()?;
    let nanos = map
        .get("nanoseconds")
        .or_else(|| map.get("_nanoseconds"))?
        .as_u64()?;
    let nanos = u32::try_from(nanos).ok()?;
    let timestamp = DateTime::<Utc>::from_timestamp(seconds, nanos)?;
    Some(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Deserialize a field, mapping a wrong type (or null) to `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// PINs were written both as integers and as digit strings such as "0042"
fn lenient_pin<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                text.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    })
}

/// Accepts epoch seconds (integer or float) and normalized ISO strings;
/// entries of any other shape are dropped
fn lenient_timestamps<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };

    let timestamps = items
        .iter()
        .filter_map(|item| match item {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|seconds| seconds.floor() as i64)),
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|timestamp| timestamp.timestamp()),
            _ => None,
        })
        .collect();

    Ok(Some(timestamps))
}
