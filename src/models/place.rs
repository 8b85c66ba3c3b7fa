use serde::{Deserialize, Serialize};

/// Nested opening-hours blob as some provider responses deliver it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: bool,
}

/// A candidate medical facility as delivered by the places provider.
///
/// The provider is inconsistent: openness, distance, kind and even the id
/// column each arrive under one of two names depending on the lookup path,
/// so the accessors below resolve the alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    /// Alternate id column used by raw provider payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Place {
    /// Whether the place is currently open, under either flag the provider uses.
    pub fn is_open(&self) -> bool {
        self.open.unwrap_or(false) || self.opening_hours.as_ref().is_some_and(|h| h.open_now)
    }

    /// Canonical id: the dedicated `place_id` column wins when present.
    pub fn canonical_id(&self) -> &str {
        self.place_id.as_deref().unwrap_or(&self.id)
    }

    /// Distance used for ranking, under either column.
    pub fn distance_value(&self) -> Option<f64> {
        self.distance_meters.or(self.distance)
    }

    /// Facility kind, falling back to the first provider type tag.
    pub fn kind_label(&self) -> &str {
        self.kind
            .as_deref()
            .or_else(|| {
                self.types
                    .as_ref()
                    .and_then(|t| t.first())
                    .map(String::as_str)
            })
            .unwrap_or("")
    }
}
