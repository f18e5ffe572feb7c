use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub type AddressId = String;
pub type UnitId = String;
pub type ListId = String;

/// A WGS84 position in map order: `lng` first, then `lat`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// `(0, 0)` marks a missing geocode. Such addresses never reach the map.
    pub fn is_placeable(&self) -> bool {
        !(self.lng == 0.0 && self.lat == 0.0) && self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

/// Canvassing outcome of a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitStatus {
    Offen,
    NichtAngetroffen,
    KarteEingeworfen,
    Potenzial,
    Neukunde,
    Bestandskunde,
    KeinInteresse,
    Termin,
    NichtVorhanden,
    Gewerbe,
    /// Project-defined status outside the fixed vocabulary.
    Custom(String),
}

impl UnitStatus {
    pub const BUILT_IN: [UnitStatus; 10] = [
        UnitStatus::Offen,
        UnitStatus::NichtAngetroffen,
        UnitStatus::KarteEingeworfen,
        UnitStatus::Potenzial,
        UnitStatus::Neukunde,
        UnitStatus::Bestandskunde,
        UnitStatus::KeinInteresse,
        UnitStatus::Termin,
        UnitStatus::NichtVorhanden,
        UnitStatus::Gewerbe,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            UnitStatus::Offen => "offen",
            UnitStatus::NichtAngetroffen => "nicht-angetroffen",
            UnitStatus::KarteEingeworfen => "karte-eingeworfen",
            UnitStatus::Potenzial => "potenzial",
            UnitStatus::Neukunde => "neukunde",
            UnitStatus::Bestandskunde => "bestandskunde",
            UnitStatus::KeinInteresse => "kein-interesse",
            UnitStatus::Termin => "termin",
            UnitStatus::NichtVorhanden => "nicht-vorhanden",
            UnitStatus::Gewerbe => "gewerbe",
            UnitStatus::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, UnitStatus::Custom(_))
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        UnitStatus::Offen
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.to_lowercase().replace(['_', ' '], "-");
        let status = UnitStatus::BUILT_IN
            .iter()
            .find(|status| status.as_str() == normalized)
            .cloned()
            .unwrap_or_else(|| UnitStatus::Custom(trimmed.to_string()));
        Ok(status)
    }
}

impl Serialize for UnitStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UnitStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse::<UnitStatus>().unwrap_or_else(|never| match never {}))
    }
}

/// A canvassable sub-address (Wohneinheit).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub coordinates: LngLat,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Address {
    pub fn is_placeable(&self) -> bool {
        self.coordinates.is_placeable()
    }

    /// "Hauptstraße 4a"
    pub fn street_line(&self) -> String {
        format!("{} {}", self.street, self.house_number).trim().to_string()
    }
}

/// A canvassing list ("Laufliste"). Consumed, never owned, by the map core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laufliste {
    pub id: ListId,
    #[serde(default)]
    pub name: Option<String>,
    pub color: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub member_address_ids: Vec<AddressId>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Laufliste {
    pub fn memberships(&self) -> Vec<ListMembership> {
        self.member_address_ids
            .iter()
            .map(|address_id| ListMembership {
                address_id: address_id.clone(),
                list_id: self.id.clone(),
                list_color: self.color.clone(),
                list_name: self.name.clone(),
                assigned_to: self.assigned_to.clone(),
                assigned_at: self.assigned_at,
            })
            .collect()
    }
}

/// One row of the address/list join as returned by the membership collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembership {
    pub address_id: AddressId,
    pub list_id: ListId,
    pub list_color: String,
    #[serde(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParityMode {
    #[default]
    All,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentMode {
    #[default]
    All,
    Unassigned,
    NoList,
}

/// User-controlled filter dimensions. Dimensions are ANDed; `status_set` is ORed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_term: String,
    pub status_set: BTreeSet<UnitStatus>,
    pub street_equals: Option<String>,
    pub city_equals: Option<String>,
    pub postal_code_equals: Option<String>,
    pub house_number_equals: Option<String>,
    pub parity_mode: ParityMode,
    pub assignment_mode: AssignmentMode,
}

impl FilterState {
    pub fn with_statuses<I: IntoIterator<Item = UnitStatus>>(mut self, statuses: I) -> Self {
        self.status_set = statuses.into_iter().collect();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city_equals = Some(city.into());
        self
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street_equals = Some(street.into());
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_parity(mut self, parity: ParityMode) -> Self {
        self.parity_mode = parity;
        self
    }

    pub fn with_assignment(mut self, mode: AssignmentMode) -> Self {
        self.assignment_mode = mode;
        self
    }

    pub fn has_status_filter(&self) -> bool {
        !self.status_set.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LngLat,
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
}

/// The `{center, zoom}` pair captured when list focus begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub center: LngLat,
    pub zoom: f64,
}

impl From<CameraState> for SavedView {
    fn from(camera: CameraState) -> Self {
        Self {
            center: camera.center,
            zoom: camera.zoom,
        }
    }
}
