use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Members of the request body that are always assigned by the server.
pub const RESERVED_KEYS: [&str; 2] = ["id", "timestamp"];

/// A stored contact-form entry.
///
/// Older collections may hold records with missing or non-string text
/// fields; those read back as empty or stringified text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub service: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
    /// Any other members the caller sent, kept verbatim.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
    #[serde(serialize_with = "millis_rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub id: i64,
}

/// Body of `POST /api/contact`. Nothing is validated: absent or `null` fields
/// are empty, and numbers, booleans, arrays or objects are kept as JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub service: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Submission {
    /// Build a record from caller input and server-assigned identity.
    pub fn from_input(input: ContactInput, id: i64, timestamp: DateTime<Utc>) -> Self {
        let mut extras = input.extras;
        for key in RESERVED_KEYS {
            extras.remove(key);
        }

        Self {
            name: input.name,
            email: input.email,
            service: input.service,
            message: input.message,
            extras,
            timestamp,
            id,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Always three fractional digits, e.g. `2026-10-18T09:15:02.000Z`.
fn millis_rfc3339<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
