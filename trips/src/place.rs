//! Place records as returned by the places directory.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Arithmetic midpoint between two coordinates.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self { lat: (self.lat + other.lat) / 2.0, lng: (self.lng + other.lng) / 2.0 }
    }

    /// `"lat,lng"` form used by the maps web services.
    #[must_use]
    pub fn to_param(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// Opening hours arrive either pre-flattened to weekday lines (enriched
/// backend response) or as the raw directory object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpeningHours {
    WeekdayText(Vec<String>),
    Detail {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open_now: Option<bool>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        weekday_text: Vec<String>,
    },
}

impl OpeningHours {
    #[must_use]
    pub fn weekday_text(&self) -> &[String] {
        match self {
            Self::WeekdayText(lines) | Self::Detail { weekday_text: lines, .. } => lines,
        }
    }

    #[must_use]
    pub fn open_now(&self) -> Option<bool> {
        match self {
            Self::WeekdayText(_) => None,
            Self::Detail { open_now, .. } => *open_now,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacePhoto {
    #[serde(default)]
    pub photo_reference: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A point of interest. Sourced verbatim from the directory; consumers only
/// filter, sort and display it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u64>,
    /// 0-4 scale.
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Short address from nearby and text search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, alias = "formatted_phone_number", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<PlacePhoto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
}

impl Place {
    #[must_use]
    pub fn location(&self) -> Option<LatLng> {
        self.geometry.map(|g| g.location)
    }

    /// Rating with missing values ranked as zero.
    #[must_use]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Full address, else the short vicinity.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        let full = self.formatted_address.as_deref().filter(|s| !s.is_empty());
        full.or_else(|| self.vicinity.as_deref().filter(|s| !s.is_empty()))
    }

    /// Address when known, otherwise the display name.
    #[must_use]
    pub fn address_or_name(&self) -> Option<&str> {
        self.address().or(self.name.as_deref())
    }
}

/// The `limit` best-rated places, highest first.
///
/// The sort is stable: places with equal ratings keep their input order.
#[must_use]
pub fn top_rated(places: &[Place], limit: usize) -> Vec<Place> {
    let mut ranked = places.to_vec();
    ranked.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
#[path = "place_test.rs"]
mod tests;
