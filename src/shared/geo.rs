use std::{cmp, fmt::Display, iter::Sum};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }
}

/// A point on the map, the atomic coordinate unit for every geometry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

/// Averages the coordinates, used to anchor popups on rings.
impl Sum for Coordinate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut count: usize = 0;
        let mut lat: f64 = 0.0;
        let mut lon: f64 = 0.0;
        iter.for_each(|coordinate| {
            count += 1;
            lat += coordinate.latitude;
            lon += coordinate.longitude;
        });
        if count == 0 {
            return Self::default();
        }
        let count = count as f64;
        Self {
            latitude: lat / count,
            longitude: lon / count,
        }
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// GeoJSON position order, `[longitude, latitude]`.
    pub fn to_position(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    pub fn from_position(position: [f64; 2]) -> Self {
        Self {
            latitude: position[1],
            longitude: position[0],
        }
    }
}

/// Leaflet style `{ lat, lng }` pair as the map surface and store carry it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl LatLng {
    /// Present-vs-missing matters here, zero is a valid coordinate.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }
}

impl From<Coordinate> for LatLng {
    fn from(value: Coordinate) -> Self {
        Self {
            lat: Some(value.latitude),
            lng: Some(value.longitude),
        }
    }
}

#[test]
fn centroid_test() {
    let ring = [
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 2.0),
        Coordinate::new(2.0, 2.0),
        Coordinate::new(2.0, 0.0),
    ];
    let center: Coordinate = ring.into_iter().sum();
    assert_eq!(center, Coordinate::new(1.0, 1.0));
}

#[test]
fn empty_centroid_test() {
    let center: Coordinate = std::iter::empty::<Coordinate>().sum();
    assert_eq!(center, Coordinate::default());
}

#[test]
fn distance_order_test() {
    assert!(Distance::from_meters(0.5) > Distance::ZERO);
    assert_eq!(Distance::from_meters(500.0).as_meters(), 500.0);
}

#[test]
fn well_formed_test() {
    assert!(Coordinate::new(0.0, 0.0).is_well_formed());
    assert!(!Coordinate::new(f64::NAN, 0.0).is_well_formed());
    assert!(!Coordinate::new(1.0, f64::INFINITY).is_well_formed());
}
