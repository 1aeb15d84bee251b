use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    config::MarkerIcon,
    sector::{DeviceId, Geometry, PersonnelOption, SectorId, SectorRecord},
    shared::{Coordinate, Distance},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub label: String,
    pub anchor: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Shape {
    Circle { center: Coordinate, radius: Distance },
    Polygon { ring: Vec<Coordinate> },
    Marker { position: Coordinate, icon: MarkerIcon },
}

/// Sector boundary as drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeOverlay {
    pub sector_id: SectorId,
    pub shape: Shape,
    pub popup: Popup,
}

/// Personnel position embedded in a sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOverlay {
    pub sector_id: SectorId,
    pub device_id: DeviceId,
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub popup: Popup,
}

/// Everything rendered from one sector snapshot. Always replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlaySet {
    pub shapes: Vec<ShapeOverlay>,
    pub markers: Vec<MarkerOverlay>,
}

impl OverlaySet {
    pub fn popups(&self) -> impl Iterator<Item = &Popup> {
        self.shapes
            .iter()
            .map(|shape| &shape.popup)
            .chain(self.markers.iter().map(|marker| &marker.popup))
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.markers.is_empty()
    }
}

/// Projects a sector collection snapshot into overlays.
///
/// Records that cannot be read are skipped, as are personnel entries without
/// both coordinates.
pub fn project_sectors(snapshot: Option<&Value>, icon: &MarkerIcon) -> OverlaySet {
    let mut overlays = OverlaySet::default();
    let Some(sectors) = snapshot.and_then(Value::as_object) else {
        return overlays;
    };

    for (id, value) in sectors {
        let record: SectorRecord = match serde_json::from_value(value.clone()) {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping unreadable sector {id}: {err}");
                continue;
            }
        };
        let sector = record.into_sector(id.clone());

        match &sector.geometry {
            Some(Geometry::Circle { center, radius }) => overlays.shapes.push(ShapeOverlay {
                sector_id: sector.id.clone(),
                shape: Shape::Circle {
                    center: *center,
                    radius: *radius,
                },
                popup: popup(&sector.title, *center),
            }),
            Some(Geometry::Polygon { rings }) => {
                for ring in rings {
                    overlays.shapes.push(ShapeOverlay {
                        sector_id: sector.id.clone(),
                        shape: Shape::Polygon { ring: ring.clone() },
                        popup: popup(&sector.title, ring.iter().copied().sum()),
                    });
                }
            }
            Some(Geometry::Polyline { points }) => overlays.shapes.push(ShapeOverlay {
                sector_id: sector.id.clone(),
                shape: Shape::Polygon {
                    ring: points.clone(),
                },
                popup: popup(&sector.title, points.iter().copied().sum()),
            }),
            Some(Geometry::Marker { position }) => overlays.shapes.push(ShapeOverlay {
                sector_id: sector.id.clone(),
                shape: Shape::Marker {
                    position: *position,
                    icon: icon.clone(),
                },
                popup: popup(&sector.title, *position),
            }),
            None => {}
        }

        for (device_id, person) in &sector.personnel {
            let Some(position) = person.position() else {
                warn!(
                    "Personnel coordinates are undefined for {device_id} in sector {}",
                    sector.id
                );
                continue;
            };
            let label = person.name.clone().unwrap_or_else(|| device_id.clone());
            overlays.markers.push(MarkerOverlay {
                sector_id: sector.id.clone(),
                device_id: device_id.clone(),
                position,
                icon: icon.clone(),
                popup: popup(&label, position),
            });
        }
    }
    overlays
}

/// Projects a roster snapshot into multi-select options.
pub fn project_roster(snapshot: Option<&Value>) -> Vec<PersonnelOption> {
    let Some(roster) = snapshot.and_then(Value::as_object) else {
        return Vec::new();
    };
    roster
        .iter()
        .map(|(id, record)| PersonnelOption {
            value: id.clone(),
            label: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string(),
        })
        .collect()
}

fn popup(label: &str, anchor: Coordinate) -> Popup {
    Popup {
        label: label.to_string(),
        anchor,
    }
}
