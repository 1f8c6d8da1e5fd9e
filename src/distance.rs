use std::{fmt, str::FromStr};

use nalgebra::DMatrix;
use serde::Deserialize;

use crate::error::JoinError;
use crate::records::LatLng;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Rows are addresses of one chunk, columns are active postcodes.
pub type DistanceMatrix = DMatrix<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Great-circle distance in km. Slower but exact on the sphere.
    #[serde(alias = "accuracy")]
    Geodesic,
    /// Euclidean distance in raw degree space. Only the ranking is meaningful.
    #[serde(alias = "speed")]
    Planar,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Planar
    }
}

impl FromStr for Metric {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geodesic" | "accuracy" => Ok(Metric::Geodesic),
            "planar" | "speed" => Ok(Metric::Planar),
            other => Err(JoinError::InvalidMetric(other.to_owned())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Geodesic => write!(f, "geodesic"),
            Metric::Planar => write!(f, "planar"),
        }
    }
}

impl Metric {
    pub fn distance(&self, a: &LatLng, b: &LatLng) -> f64 {
        match self {
            Metric::Geodesic => haversine_distance(a, b),
            Metric::Planar => planar_distance(a, b),
        }
    }

    /// Broadcasts `rows` against every point in `columns`.
    pub fn matrix(&self, rows: &[LatLng], columns: &[LatLng]) -> DistanceMatrix {
        DMatrix::from_fn(rows.len(), columns.len(), |i, j| {
            self.distance(&rows[i], &columns[j])
        })
    }
}

/// Haversine distance in km between two points given in degrees.
pub fn haversine_distance(a: &LatLng, b: &LatLng) -> f64 {
    let (lat_1, lng_1) = (a.x.to_radians(), a.y.to_radians());
    let (lat_2, lng_2) = (b.x.to_radians(), b.y.to_radians());

    let lat_diff = lat_2 - lat_1;
    let lng_diff = lng_2 - lng_1;

    let mut h = (lat_diff * 0.5).sin().powi(2)
        + lat_1.cos() * lat_2.cos() * (lng_diff * 0.5).sin().powi(2);
    // Rounding can push near-antipodal points just past 1. NaN must pass through.
    if h > 1.0 {
        h = 1.0;
    }

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn planar_distance(a: &LatLng, b: &LatLng) -> f64 {
    a.metric_distance(b)
}
