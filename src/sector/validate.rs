use serde_json::Value;

use crate::shared::{Coordinate, LatLng};

/// Shape well-formedness gate for coordinate lists.
///
/// True only if `coordinates` is an array whose every element is itself an
/// array of at least two entries, the first two being numbers. Ring closure,
/// self intersection and coordinate ranges are not checked. The empty array
/// passes.
pub fn validate_coordinates(coordinates: &Value) -> bool {
    let Some(points) = coordinates.as_array() else {
        return false;
    };
    points.iter().all(|point| match point.as_array() {
        Some(point) => point.len() >= 2 && point[0].is_number() && point[1].is_number(),
        None => false,
    })
}

/// A circle needs both a center and a radius. A zero radius counts as missing.
pub fn validate_circle(center: Option<&LatLng>, radius: Option<f64>) -> bool {
    let has_center = center.and_then(LatLng::coordinate).is_some();
    let has_radius = radius.is_some_and(|radius| radius > 0.0);
    has_center && has_radius
}

/// A marker needs both `lat` and `lng`, zero being a valid value for either.
pub fn validate_marker(lat: Option<f64>, lng: Option<f64>) -> bool {
    lat.is_some() && lng.is_some()
}

/// Reads one validated ring of GeoJSON `[lng, lat]` positions.
pub fn ring_from_value(coordinates: &Value) -> Option<Vec<Coordinate>> {
    if !validate_coordinates(coordinates) {
        return None;
    }
    coordinates
        .as_array()?
        .iter()
        .map(|point| {
            let point = point.as_array()?;
            Some(Coordinate::from_position([
                point[0].as_f64()?,
                point[1].as_f64()?,
            ]))
        })
        .collect()
}

/// Reads either a single ring or a list of rings, every ring validated.
pub fn rings_from_value(coordinates: &Value) -> Option<Vec<Vec<Coordinate>>> {
    let items = coordinates.as_array()?;
    let nested = items
        .first()
        .and_then(Value::as_array)
        .and_then(|ring| ring.first())
        .is_some_and(Value::is_array);
    if nested {
        items.iter().map(ring_from_value).collect()
    } else {
        ring_from_value(coordinates).map(|ring| vec![ring])
    }
}

/// Writes rings back out in GeoJSON position order.
pub fn rings_to_value(rings: &[Vec<Coordinate>]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| {
                Value::Array(
                    ring.iter()
                        .map(|coordinate| {
                            let [lng, lat] = coordinate.to_position();
                            Value::from(vec![lng, lat])
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}
