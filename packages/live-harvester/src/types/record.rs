use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feed-specific fields of a record. Opaque to the engine apart from the
/// identity field.
pub type Payload = serde_json::Map<String, Value>;

/// One record as observed in a feed snapshot, before deduplication.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub payload: Payload,
}

impl RawRecord {
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }

    /// A free-text record: `{"text": ...}`.
    pub fn text(text: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.insert("text".to_string(), Value::String(text.into()));
        Self { payload }
    }

    /// Wrap a JSON object; anything else is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(payload) => Some(Self { payload }),
            _ => None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Keys written by the record itself. A payload field with one of these
/// names is kept as `source_<key>`.
pub const ENVELOPE_KEYS: [&str; 2] = ["timestamp", "match"];

/// A persisted commentary record. Immutable once created.
///
/// On disk: `{"timestamp": ..., "match": ..., <payload fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentaryRecord {
    /// Local capture time, not source time.
    #[serde(rename = "timestamp", with = "timestamp")]
    pub observed_at: DateTime<Local>,

    #[serde(rename = "match")]
    pub event_label: String,

    #[serde(flatten)]
    pub payload: Payload,
}

impl CommentaryRecord {
    pub fn new(event_label: impl Into<String>, raw: RawRecord) -> Self {
        Self::observed_at(Local::now(), event_label, raw)
    }

    pub fn observed_at(
        observed_at: DateTime<Local>,
        event_label: impl Into<String>,
        raw: RawRecord,
    ) -> Self {
        Self {
            observed_at,
            event_label: event_label.into(),
            payload: without_envelope_keys(raw.payload),
        }
    }
}

fn without_envelope_keys(mut payload: Payload) -> Payload {
    for key in ENVELOPE_KEYS {
        if let Some(value) = payload.remove(key) {
            payload.insert(format!("source_{key}"), value);
        }
    }
    payload
}

/// RFC 3339 on write. On read, naive ISO timestamps (no offset) are
/// accepted as local time.
mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(de::Error::custom)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| de::Error::custom(format!("nonexistent local time: {raw}")))
    }
}
