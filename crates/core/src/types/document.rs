//! Documents as the backend reports them

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display};
use std::ops::Deref;

/// Identifier of a stored document.
///
/// The backend emits numeric ids; they are normalised to strings on the way
/// in so the rest of the client never cares about the wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for DocumentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => DocumentId(n.to_string()),
            RawId::Text(s) => DocumentId(s),
        })
    }
}

/// A stored document's metadata. The bytes stay on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(rename = "fileName", alias = "name", default)]
    pub name: String,
    #[serde(rename = "fileType", alias = "contentType", default)]
    pub content_type: String,
    #[serde(rename = "fileSize", alias = "size", default)]
    pub size: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(
        rename = "uploadDate",
        default,
        deserialize_with = "deserialize_upload_date"
    )]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(rename = "isPublic", default)]
    pub is_public: bool,
}

impl Document {
    /// Display name with the same fallback the list view uses
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Untitled Document"
        } else {
            &self.name
        }
    }

    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Uncategorized")
    }
}

// The backend serialises either an RFC 3339 instant or a zone-less local
// timestamp; the latter is read as UTC.
fn deserialize_upload_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
