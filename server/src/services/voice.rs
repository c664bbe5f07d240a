//! Voice command parsing and vague-location resolution.
//!
//! DESIGN
//! ======
//! The model splits a command into origin, destination and search query,
//! and flags commands that refer to places only by context ("the other
//! one"). Each endpoint that looks vague then goes through a lookup chain:
//!
//! 1. geocode the text directly
//! 2. ask the model for a search query and run a text search, biased
//!    around the other endpoint when there is one
//! 3. retry with just the first two words of that query, wider
//! 4. give up and keep the text as spoken
//!
//! When the command carries a context ("McDonald's" in "the other one"),
//! the destination is also looked up as another branch of that context near
//! the origin, and finally by a broad search. Lookup failures never fail the
//! request; they only leave text unresolved.

use serde::Deserialize;
use tracing::{info, warn};
use trips::{LatLng, Place, ResolutionMethod, VoiceParse};

use crate::llm::{LlmChat, LlmError, complete_json};
use crate::maps::{MapsApi, TextSearch};
use crate::services::vague::{is_vague_location, needs_resolution};

/// Text-search radius when the search is biased around a known point.
pub const BIASED_RADIUS_M: u32 = 5_000;
/// Text-search radius for an unbiased search.
pub const BROAD_RADIUS_M: u32 = 10_000;
/// Radius for the last-chance two-word search.
pub const FALLBACK_RADIUS_M: u32 = 15_000;

pub const CURRENT_LOCATION: &str = "Current Location";

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Failed to parse voice command: {0}")]
    Parse(#[from] LlmError),
}

// =============================================================================
// MODEL REPLIES
// =============================================================================

/// Model output for a command. `semanticQuery` spelling varies, so it is
/// read through [`VoiceParse::from_wire`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandParse {
    pub parse: VoiceParse,
    pub is_vague: bool,
    pub vague_context: String,
}

impl CommandParse {
    fn from_reply(value: &serde_json::Value) -> Result<Self, LlmError> {
        let parse = VoiceParse::from_wire(value).map_err(|e| LlmError::ReplyFormat(e.to_string()))?;
        let is_vague = value.get("isVague").and_then(serde_json::Value::as_bool).unwrap_or(false);
        let vague_context = value
            .get("vagueContext")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_owned();
        Ok(Self { parse, is_vague, vague_context })
    }
}

#[derive(Debug, Deserialize)]
struct LocationQuery {
    #[serde(default)]
    search_query: Option<String>,
    #[serde(default)]
    location_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContextQuery {
    #[serde(default)]
    search_query: Option<String>,
}

// =============================================================================
// PROMPTS
// =============================================================================

const PARSE_SYSTEM: &str = r#"You turn a traveller's spoken command into JSON.

Extract:
- "origin": where the trip starts
- "destination": where the trip ends
- "semanticQuery": what the traveller wants to find or do on the way
- "isVague": true when a location is only described by context ("the other one", "another place")
- "vagueContext": the business or landmark that context refers to, when isVague is true

Rules:
- Reply with a single JSON object and nothing else.
- Use "" for any field the command does not mention.
- Keep relative descriptions ("a McDonald's next to UTC") verbatim in origin or destination.

Examples:
"I want to go from 8875 Costa Verde Boulevard to the Price Center in San Diego and I want pizza on the way"
{"origin": "8875 Costa Verde Boulevard", "destination": "the Price Center in San Diego", "semanticQuery": "pizza on the way", "isVague": false}

"I'm in McDonalds and want to go to the other one"
{"origin": "McDonalds", "destination": "the other one", "semanticQuery": "", "isVague": true, "vagueContext": "McDonalds"}

"find coffee shops nearby"
{"origin": "", "destination": "", "semanticQuery": "find coffee shops nearby", "isVague": false}"#;

fn location_prompt(location: &str, role: &str, reference: Option<&str>) -> String {
    let context = reference.map_or_else(String::new, |r| format!(" The user is at or near: {r}."));
    format!(
        r#"The user gave this {role}: "{location}".{context}

Write a search query that would find this place, keeping the business name and any landmark.
Examples:
- "a McDonald's next to UTC in La Jolla San Diego" -> "McDonald's UTC La Jolla San Diego"
- "the mall" -> "shopping mall"
- "near Starbucks" -> "Starbucks coffee shop"
- "here" -> location_type "current_location"

Reply with JSON only:
{{"search_query": "...", "location_type": "business|landmark|area|current_location"}}"#
    )
}

fn context_prompt(command: &str, context: &str) -> String {
    format!(
        r#"The user said: "{command}"
They are referring to: {context}

Write a specific place search for what they want, e.g. "the other McDonalds" -> "McDonalds restaurant".

Reply with JSON only:
{{"search_query": "..."}}"#
    )
}

// =============================================================================
// RESOLVER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Origin,
    Destination,
}

impl EndpointRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        }
    }
}

/// The first best-rated place. Unrated places rank as zero.
#[must_use]
pub fn best_rated(places: &[Place]) -> Option<&Place> {
    places.iter().fold(None, |best: Option<&Place>, place| match best {
        Some(b) if b.rating_or_zero() >= place.rating_or_zero() => Some(b),
        _ => Some(place),
    })
}

fn display_text(place: &Place) -> Option<String> {
    place.address_or_name().map(str::to_owned)
}

pub struct VoiceResolver<'a> {
    llm: &'a dyn LlmChat,
    maps: &'a dyn MapsApi,
}

impl<'a> VoiceResolver<'a> {
    #[must_use]
    pub fn new(llm: &'a dyn LlmChat, maps: &'a dyn MapsApi) -> Self {
        Self { llm, maps }
    }

    /// Parse a command and resolve any vague endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Parse`] when the model call fails or its reply
    /// is not a command object. Resolution problems are not errors.
    pub async fn parse_command(&self, command: &str) -> Result<VoiceParse, VoiceError> {
        let prompt = format!("Command to parse:\n\"{command}\"");
        let reply: serde_json::Value = complete_json(self.llm, PARSE_SYSTEM, &prompt).await?;
        let parsed = CommandParse::from_reply(&reply)?;
        info!(
            has_origin = !parsed.parse.origin.is_empty(),
            has_destination = !parsed.parse.destination.is_empty(),
            is_vague = parsed.is_vague,
            "voice: command parsed"
        );
        Ok(self.resolve_command(parsed, command).await)
    }

    /// Run the resolution strategies over a parsed command.
    pub async fn resolve_command(&self, parsed: CommandParse, command: &str) -> VoiceParse {
        let CommandParse { parse, vague_context, .. } = parsed;
        let origin = parse.origin.clone();
        let destination = parse.destination.clone();

        let mut resolved_origin = origin.clone();
        let mut resolved_destination = destination.clone();
        let mut methods = Vec::new();
        let mut search_used = None;

        if !origin.is_empty() && needs_resolution(&origin) {
            resolved_origin = self.resolve_location(&origin, EndpointRole::Origin, None).await;
            if resolved_origin != origin {
                methods.push(ResolutionMethod::OriginResolution);
            }
        }

        if !destination.is_empty() && needs_resolution(&destination) {
            let reference = Some(resolved_origin.as_str()).filter(|r| !r.is_empty());
            resolved_destination = self.resolve_location(&destination, EndpointRole::Destination, reference).await;
            if resolved_destination != destination {
                methods.push(ResolutionMethod::DestinationResolution);
            }
        }

        let destination_specific = !is_vague_location(&destination);
        if !vague_context.is_empty() && destination_specific {
            if !destination.is_empty() && !resolved_origin.is_empty() {
                if let Some((found, query)) = self.nearby_search(&vague_context, &resolved_origin).await {
                    resolved_destination = found;
                    search_used = Some(query);
                    methods.push(ResolutionMethod::NearbySearch);
                }
            }
            if let Some((found, query)) = self.broad_search(command, &vague_context).await {
                resolved_destination = found;
                search_used = Some(query);
                methods.push(ResolutionMethod::BroadSearch);
            }
        }

        if methods.is_empty() {
            return parse;
        }
        info!(?methods, "voice: locations resolved");
        VoiceParse {
            original_origin: (origin != resolved_origin).then_some(origin),
            original_destination: (destination != resolved_destination).then_some(destination),
            origin: resolved_origin,
            destination: resolved_destination,
            semantic_query: parse.semantic_query,
            resolved: true,
            resolution_methods: methods,
            search_used,
        }
    }

    /// Turn vague location text into something routable. Returns the input
    /// unchanged when every strategy comes up empty.
    pub async fn resolve_location(&self, location: &str, role: EndpointRole, reference: Option<&str>) -> String {
        match self.maps.geocode(location).await {
            Ok(hits) => {
                if let Some(hit) = hits.first() {
                    info!(role = role.as_str(), "voice: resolved by direct geocode");
                    return hit.formatted_address.clone();
                }
            }
            Err(e) => warn!(error = %e, role = role.as_str(), "voice: direct geocode failed"),
        }

        let query: LocationQuery =
            match complete_json(self.llm, "", &location_prompt(location, role.as_str(), reference)).await {
                Ok(q) => q,
                Err(e) => {
                    warn!(error = %e, role = role.as_str(), "voice: location query generation failed");
                    return location.to_owned();
                }
            };
        if query.location_type.as_deref() == Some("current_location") {
            return CURRENT_LOCATION.to_owned();
        }
        let search_query = query
            .search_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| location.to_owned());

        let mut search = TextSearch::new(search_query.as_str(), BROAD_RADIUS_M);
        if let Some(reference) = reference {
            if let Some(point) = self.locate(reference).await {
                search = search.near(point);
                search.radius_m = BIASED_RADIUS_M;
            }
        }
        if let Some(found) = self.best_match(&search).await {
            info!(role = role.as_str(), %search_query, "voice: resolved by text search");
            return found;
        }

        let words: Vec<&str> = search_query.split_whitespace().collect();
        if words.len() >= 2 {
            let broader = TextSearch::new(words[..2].join(" "), FALLBACK_RADIUS_M);
            if let Some(found) = self.best_match(&broader).await {
                info!(role = role.as_str(), query = %broader.query, "voice: resolved by broader search");
                return found;
            }
        }

        location.to_owned()
    }

    /// Another branch of `context` near the origin: skip the first name
    /// match (where the user is) and take the best-rated of the rest.
    async fn nearby_search(&self, context: &str, origin: &str) -> Option<(String, String)> {
        let point = self.locate(origin).await?;
        let query = format!("{context} near {origin}");
        let places = match self.maps.text_search(&TextSearch::new(query.as_str(), BIASED_RADIUS_M).near(point)).await {
            Ok(places) => places,
            Err(e) => {
                warn!(error = %e, "voice: nearby search failed");
                return None;
            }
        };
        let needle = context.to_lowercase();
        let others: Vec<Place> = places
            .into_iter()
            .filter(|p| p.name.as_deref().unwrap_or_default().to_lowercase().contains(&needle))
            .skip(1)
            .collect();
        best_rated(&others).and_then(display_text).map(|found| (found, query))
    }

    /// The best-rated match anywhere for a model-written query about `context`.
    async fn broad_search(&self, command: &str, context: &str) -> Option<(String, String)> {
        let query = match complete_json::<ContextQuery>(self.llm, "", &context_prompt(command, context)).await {
            Ok(reply) => reply.search_query.filter(|q| !q.trim().is_empty()).unwrap_or_else(|| context.to_owned()),
            Err(e) => {
                warn!(error = %e, "voice: broad search query generation failed");
                return None;
            }
        };
        let found = self.best_match(&TextSearch::new(query.as_str(), BROAD_RADIUS_M)).await?;
        Some((found, query))
    }

    async fn locate(&self, text: &str) -> Option<LatLng> {
        match self.maps.geocode(text).await {
            Ok(hits) => hits.first().map(|h| h.location),
            Err(e) => {
                warn!(error = %e, "voice: reference geocode failed");
                None
            }
        }
    }

    async fn best_match(&self, search: &TextSearch) -> Option<String> {
        match self.maps.text_search(search).await {
            Ok(places) => best_rated(&places).and_then(display_text),
            Err(e) => {
                warn!(error = %e, query = %search.query, "voice: text search failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
