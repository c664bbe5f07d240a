//! Voice command parse records.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::WireError;

/// Body of `POST /api/parse-voice-query`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCommandRequest {
    pub command: String,
}

/// How a vague spoken location was mapped to a concrete address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionMethod {
    ExactMatch,
    OriginResolution,
    DestinationResolution,
    NearbySearch,
    BroadSearch,
    Other(String),
}

impl ResolutionMethod {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "exact_match" => Self::ExactMatch,
            "origin_resolution" => Self::OriginResolution,
            "destination_resolution" => Self::DestinationResolution,
            "nearby_search" => Self::NearbySearch,
            "broad_search" => Self::BroadSearch,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::OriginResolution => "origin_resolution",
            Self::DestinationResolution => "destination_resolution",
            Self::NearbySearch => "nearby_search",
            Self::BroadSearch => "broad_search",
            Self::Other(tag) => tag,
        }
    }

    /// Short label for display next to the resolved text.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::ExactMatch => "exact match",
            Self::OriginResolution => "origin looked up",
            Self::DestinationResolution => "destination looked up",
            Self::NearbySearch => "nearby search",
            Self::BroadSearch => "broad search",
            Self::Other(tag) => tag,
        }
    }
}

impl Serialize for ResolutionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Canonical parse of a spoken or typed trip command.
///
/// Empty strings mean "not mentioned".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VoiceParse {
    pub origin: String,
    pub destination: String,
    #[serde(rename = "semanticQuery")]
    pub semantic_query: String,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resolution_methods: Vec<ResolutionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_used: Option<String>,
}

const SEMANTIC_QUERY_KEYS: &[&str] = &["semanticQuery", "semanticquery", "semantic_query", "query"];

impl VoiceParse {
    /// Normalize a parser response.
    ///
    /// Accepts every key spelling the parser has been seen to emit for the
    /// semantic query, and a single `resolution_method` or a
    /// `resolution_methods` list.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::NotAnObject`] when the payload is not a JSON object.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let Some(obj) = value.as_object() else {
            return Err(WireError::NotAnObject("voice parse"));
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();
        let optional = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let semantic_query = SEMANTIC_QUERY_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();

        let mut resolution_methods = Vec::new();
        match obj.get("resolution_methods") {
            Some(Value::Array(items)) => {
                resolution_methods.extend(items.iter().filter_map(Value::as_str).map(ResolutionMethod::from_tag));
            }
            Some(Value::String(tag)) => resolution_methods.push(ResolutionMethod::from_tag(tag)),
            _ => {}
        }
        if let Some(tag) = obj.get("resolution_method").and_then(Value::as_str) {
            let method = ResolutionMethod::from_tag(tag);
            if !resolution_methods.contains(&method) {
                resolution_methods.push(method);
            }
        }

        Ok(Self {
            origin: text("origin"),
            destination: text("destination"),
            semantic_query,
            resolved: obj.get("resolved").and_then(Value::as_bool).unwrap_or(false),
            resolution_methods,
            original_origin: optional("original_origin"),
            original_destination: optional("original_destination"),
            search_used: optional("search_used"),
        })
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
