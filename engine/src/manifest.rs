//! Theme manifest model.
//!
//! The manifest is the JSON document embedded at the head of every `.reskin`
//! package and stored as `reskin.json` inside every installed theme directory.
//! A [`ThemeManifest`] only exists once it has been fully validated: its name
//! is non-blank and its tags are always a sequence.
//!
//! Older packages store `tags` as a single string. Both shapes are accepted and
//! normalized, and serialization always writes an array.
//!
//! # Examples
//!
//! ```no_run
//! use engine::manifest::ThemeManifest;
//!
//! let manifest = ThemeManifest::from_json_slice(br#"{
//!     "name": "Cool", "author": "a", "version": "1.0",
//!     "license": "MIT", "tags": "dark"
//! }"#)?;
//! assert_eq!(manifest.tags, vec!["dark".to_string()]);
//! # Ok::<(), engine::common::DecodeError>(())
//! ```

use crate::common::DecodeError;
use serde::{Deserialize, Deserializer, Serialize};

/// Validated theme metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeManifest {
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: String,
    pub tags: Vec<String>,
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Wire shape of the manifest before required fields are checked.
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    author: Option<String>,
    #[serde(default)]
    description: Option<String>,
    version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    tags: Vec<String>,
    license: Option<String>,
    #[serde(default)]
    preview: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    One(String),
    Many(Vec<String>),
}

/// Accepts `tags` as an array, a single string, or null.
pub(crate) fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<TagsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TagsRepr::One(tag)) => normalize_tag_string(&tag),
        Some(TagsRepr::Many(tags)) => tags,
    };
    Ok(tags)
}

fn normalize_tag_string(tag: &str) -> Vec<String> {
    if tag.trim().is_empty() {
        Vec::new()
    } else {
        vec![tag.to_string()]
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, DecodeError> {
    value.ok_or_else(|| DecodeError::MissingField(field.to_string()))
}

impl ThemeManifest {
    /// Parses and validates a manifest from raw JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawManifest = serde_json::from_slice(bytes)
            .map_err(|e| DecodeError::InvalidManifest(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Serializes the manifest as it is stored in `reskin.json`.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Serializes the manifest as it is embedded in a package.
    pub fn to_json_compact(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Comma separated tags for single-line display.
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }
}

impl TryFrom<RawManifest> for ThemeManifest {
    type Error = DecodeError;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        let name = required(raw.name, "name")?;
        if name.trim().is_empty() {
            return Err(DecodeError::MissingField("name".to_string()));
        }

        Ok(Self {
            name,
            author: required(raw.author, "author")?,
            description: raw.description.unwrap_or_default(),
            version: required(raw.version, "version")?,
            tags: raw.tags,
            license: required(raw.license, "license")?,
            preview: raw.preview.filter(|p| !p.trim().is_empty()),
        })
    }
}

impl<'de> Deserialize<'de> for ThemeManifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawManifest::deserialize(deserializer)?;
        ThemeManifest::try_from(raw).map_err(serde::de::Error::custom)
    }
}
