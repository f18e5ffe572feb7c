use crate::domain::model::{AddressId, CameraState, ListId, LngLat, UnitStatus};
use serde::{Deserialize, Serialize};

/// Resolved color assignment of one marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MarkerColor {
    Unassigned,
    #[serde(rename_all = "camelCase")]
    AssignedTo { list_id: ListId, color: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupUnit {
    pub floor: Option<String>,
    pub position: Option<String>,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupContent {
    pub title: String,
    pub subtitle: String,
    pub list_name: Option<String>,
    pub units: Vec<PopupUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    pub address_id: AddressId,
    pub position: LngLat,
    /// Hex color the surface paints.
    pub color: String,
    pub assignment: MarkerColor,
    /// Unit count shown on the pin.
    pub label: usize,
    pub popup: PopupContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl Bounds {
    pub fn from_point(point: LngLat) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LngLat) {
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
            && point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CameraMove {
    #[serde(rename_all = "camelCase")]
    FitBounds {
        bounds: Bounds,
        padding_px: f64,
        max_zoom: f64,
        /// Horizontal shift of the visual center, in screen pixels.
        offset_px: f64,
        target: CameraState,
    },
    DrillIn { target: CameraState },
    Restore { target: CameraState },
}

impl CameraMove {
    pub fn target(&self) -> CameraState {
        match self {
            CameraMove::FitBounds { target, .. }
            | CameraMove::DrillIn { target }
            | CameraMove::Restore { target } => *target,
        }
    }
}

/// A fire-and-forget camera animation. `replaces` names the in-flight
/// animation the surface must cancel before starting this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraTransition {
    pub id: u64,
    pub replaces: Option<u64>,
    pub camera: CameraMove,
}
