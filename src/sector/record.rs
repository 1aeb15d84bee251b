use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{
    DeviceId, DraftSector, Geometry, PersistedSector, PersonnelId, PersonnelRecord,
    PersonnelSnapshot, SectorId,
    validate::{rings_from_value, rings_to_value, validate_circle},
};
use crate::shared::{
    Coordinate, Distance, LatLng, format_form_date, format_form_time, parse_form_date,
    parse_form_time,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleRecord {
    #[serde(default)]
    pub center: Option<LatLng>,
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Sector as stored under the sector collection.
///
/// The store is schemaless, so the shape of a record is only known from which
/// of `circle`, `coordinates` and `marker` it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<CircleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<LatLng>,
    #[serde(
        default,
        deserialize_with = "readable_personnel",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub personnel: BTreeMap<DeviceId, PersonnelSnapshot>,
}

/// Decodes personnel entries one by one. An unreadable entry is dropped
/// without taking the rest of the sector with it.
fn readable_personnel<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<DeviceId, PersonnelSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            warn!("Ignoring personnel that is not a map: {other}");
            return Ok(BTreeMap::new());
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|(device_id, entry)| match serde_json::from_value(entry) {
            Ok(snapshot) => Some((device_id, snapshot)),
            Err(err) => {
                warn!("Skipping unreadable personnel {device_id}: {err}");
                None
            }
        })
        .collect())
}

impl SectorRecord {
    /// Assembles the record written on submit. `rings` are the coordinates of
    /// every uncommitted drawn layer, the draft's own geometry decides
    /// `circle` and `marker`.
    pub fn assemble(
        draft: &DraftSector,
        rings: &[Vec<Coordinate>],
        personnel: BTreeMap<DeviceId, PersonnelSnapshot>,
    ) -> Self {
        let (circle, marker) = match &draft.geometry {
            Some(Geometry::Circle { center, radius }) => (
                Some(CircleRecord {
                    center: Some((*center).into()),
                    radius: Some(radius.as_meters()),
                }),
                None,
            ),
            Some(Geometry::Marker { position }) => (None, Some((*position).into())),
            _ => (None, None),
        };
        Self {
            title: draft.title.trim().to_string(),
            date: draft.date.as_ref().map(format_form_date),
            start_time: draft.start_time.as_ref().map(format_form_time),
            end_time: draft.end_time.as_ref().map(format_form_time),
            coordinates: (!rings.is_empty()).then(|| rings_to_value(rings)),
            circle,
            marker,
            personnel,
        }
    }

    /// Decides the geometry at read time: a circle wins, then valid
    /// coordinates, then a marker.
    pub fn geometry(&self) -> Option<Geometry> {
        if let Some(circle) = &self.circle
            && validate_circle(circle.center.as_ref(), circle.radius)
        {
            let center = circle.center.as_ref().and_then(LatLng::coordinate)?;
            let radius = Distance::from_meters(circle.radius?);
            return Some(Geometry::Circle { center, radius });
        }
        if let Some(rings) = self.coordinates.as_ref().and_then(rings_from_value) {
            let geometry = Geometry::Polygon { rings };
            if geometry.is_valid() {
                return Some(geometry);
            }
        }
        let position = self.marker.as_ref().and_then(LatLng::coordinate)?;
        Some(Geometry::Marker { position })
    }

    pub fn into_sector(self, id: SectorId) -> PersistedSector {
        let geometry = self.geometry();
        PersistedSector {
            date: parse_stored(&id, "date", self.date.as_deref(), parse_form_date),
            start_time: parse_stored(&id, "startTime", self.start_time.as_deref(), parse_form_time),
            end_time: parse_stored(&id, "endTime", self.end_time.as_deref(), parse_form_time),
            id,
            title: self.title,
            geometry,
            personnel: self.personnel,
        }
    }
}

fn parse_stored<T>(
    id: &str,
    field: &str,
    value: Option<&str>,
    parse: fn(&str) -> Result<Option<T>, chrono::ParseError>,
) -> Option<T> {
    match parse(value?) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Sector {id} has an unreadable {field}: {err}");
            None
        }
    }
}

/// Roster record as stored under the personnel collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    device_id: Option<DeviceId>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl PersonnelRecord {
    pub fn from_value(id: PersonnelId, value: Value) -> Result<Self, serde_json::Error> {
        let entry: RosterEntry = serde_json::from_value(value)?;
        let position = match (entry.latitude, entry.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        Ok(Self {
            id,
            name: entry.name,
            device_id: entry.device_id,
            position,
        })
    }

    /// The name and position captured into a submitted sector.
    pub fn snapshot(&self) -> PersonnelSnapshot {
        PersonnelSnapshot {
            name: Some(self.name.clone()),
            latitude: self.position.map(|position| position.latitude),
            longitude: self.position.map(|position| position.longitude),
        }
    }
}
