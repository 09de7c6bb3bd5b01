use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Ordered key/value mapping the service extracts from the source headers.
/// Key order is the order received (serde_json `preserve_order`).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Addressable reference to a composite image: a `data:` URL, an http(s) or
/// `file://` URL, or a plain filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data_url() {
            let header = self.0.split(',').next().unwrap_or_default();
            write!(f, "{header},<{} bytes>", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Success body of `POST /colorize-layers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizeResponse {
    #[serde(rename = "imageData")]
    pub image_data: ImageRef,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One row of `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Local>,
    pub filename: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl HistoryEntry {
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Lowercased status, used as a display-class hint ("success", "failure").
    pub fn status_class(&self) -> String {
        self.status.to_lowercase()
    }
}

/// The history service writes naive ISO-8601 local times; RFC 3339 with an
/// offset is accepted as well.
mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Local>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}
