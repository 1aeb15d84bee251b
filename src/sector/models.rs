use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{Coordinate, Distance, LatLng};

pub type PersonnelId = String;
pub type DeviceId = String;
pub type SectorId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Geometry {
    /// Rectangles and polygons both land here.
    Polygon { rings: Vec<Vec<Coordinate>> },
    Polyline { points: Vec<Coordinate> },
    Circle { center: Coordinate, radius: Distance },
    Marker { position: Coordinate },
}

impl Geometry {
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Polygon { rings } => {
                !rings.is_empty()
                    && rings
                        .iter()
                        .all(|ring| !ring.is_empty() && ring.iter().all(Coordinate::is_well_formed))
            }
            Geometry::Polyline { points } => {
                !points.is_empty() && points.iter().all(Coordinate::is_well_formed)
            }
            Geometry::Circle { center, radius } => {
                center.is_well_formed() && *radius > Distance::ZERO
            }
            Geometry::Marker { position } => position.is_well_formed(),
        }
    }

    /// Polygons and polylines are stored through a sector's `coordinates`.
    pub fn is_path(&self) -> bool {
        matches!(self, Geometry::Polygon { .. } | Geometry::Polyline { .. })
    }

    /// Coordinate rings this geometry contributes to a sector's `coordinates`.
    pub fn rings(&self) -> Vec<Vec<Coordinate>> {
        match self {
            Geometry::Polygon { rings } => rings.clone(),
            Geometry::Polyline { points } => vec![points.clone()],
            Geometry::Circle { .. } | Geometry::Marker { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Rectangle,
    Polygon,
    Polyline,
    Circle,
    Marker,
}

impl Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayerType::Rectangle => "rectangle",
            LayerType::Polygon => "polygon",
            LayerType::Polyline => "polyline",
            LayerType::Circle => "circle",
            LayerType::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Draw-complete event as emitted by the map surface.
///
/// Path layers carry raw GeoJSON coordinates (`[lng, lat]` positions), which
/// are only trusted after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layerType", rename_all = "lowercase")]
pub enum DrawnLayer {
    Rectangle {
        coordinates: Value,
    },
    Polygon {
        coordinates: Value,
    },
    Polyline {
        coordinates: Value,
    },
    Circle {
        #[serde(default)]
        center: Option<LatLng>,
        #[serde(default)]
        radius: Option<f64>,
    },
    Marker {
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lng: Option<f64>,
    },
}

impl DrawnLayer {
    pub fn layer_type(&self) -> LayerType {
        match self {
            DrawnLayer::Rectangle { .. } => LayerType::Rectangle,
            DrawnLayer::Polygon { .. } => LayerType::Polygon,
            DrawnLayer::Polyline { .. } => LayerType::Polyline,
            DrawnLayer::Circle { .. } => LayerType::Circle,
            DrawnLayer::Marker { .. } => LayerType::Marker,
        }
    }
}

/// The in-progress sector of the open form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSector {
    pub title: String,
    pub personnel_ids: BTreeSet<PersonnelId>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub geometry: Option<Geometry>,
}

impl DraftSector {
    pub fn with_geometry(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }
}

/// Personnel position captured when the sector was submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonnelSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl PersonnelSnapshot {
    pub fn position(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSector {
    pub id: SectorId,
    pub title: String,
    pub geometry: Option<Geometry>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub personnel: BTreeMap<DeviceId, PersonnelSnapshot>,
}

/// Roster entry, owned by the external roster service.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonnelRecord {
    pub id: PersonnelId,
    pub name: String,
    pub device_id: Option<DeviceId>,
    pub position: Option<Coordinate>,
}

/// One `{value, label}` entry of the personnel multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelOption {
    pub value: PersonnelId,
    pub label: String,
}
