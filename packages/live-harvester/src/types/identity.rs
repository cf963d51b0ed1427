use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::record::Payload;

/// Deduplication key of a record.
///
/// Compared by exact string equality. Numbers are kept in their JSON
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a record's identity is derived from its payload. One strategy per
/// run, fixed by the feed kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// The full text of the record, as normalized at capture time.
    Text { field: String },
    /// A sequence number assigned by the source (ball number, comment id).
    Sequence { field: String },
}

impl IdentityStrategy {
    pub fn text() -> Self {
        Self::Text {
            field: "text".to_string(),
        }
    }

    pub fn sequence(field: impl Into<String>) -> Self {
        Self::Sequence {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Text { field } | Self::Sequence { field } => field,
        }
    }

    /// Identity of a payload, or `None` if the identity field is missing,
    /// empty, or of the wrong shape.
    pub fn identify(&self, payload: &Payload) -> Option<Identity> {
        let value = payload.get(self.field())?;
        match (self, value) {
            (Self::Text { .. }, Value::String(text)) if !text.is_empty() => {
                Some(Identity::from(text.as_str()))
            }
            (Self::Sequence { .. }, Value::Number(n)) => Some(Identity::from(n.to_string())),
            (Self::Sequence { .. }, Value::String(s)) if !s.is_empty() => {
                Some(Identity::from(s.as_str()))
            }
            _ => None,
        }
    }
}
