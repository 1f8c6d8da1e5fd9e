use nalgebra::Vector2;

/// (latitude, longitude) in decimal degrees.
pub type LatLng = Vector2<f64>;

/// Parses a coordinate cell. Anything that is not a finite number becomes NaN.
pub fn parse_coordinate(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    /// Every cell of the source row, in column order.
    pub values: Vec<String>,
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,
}

impl AddressRecord {
    pub fn coordinate(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn has_coordinates(&self) -> bool {
        !(self.latitude.is_nan() || self.longitude.is_nan())
    }
}

/// The address dataset with its header row kept for export.
#[derive(Debug, Clone, Default)]
pub struct AddressTable {
    pub headers: Vec<String>,
    pub records: Vec<AddressRecord>,
}

impl AddressTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coordinates of every address, aligned with `records`.
    pub fn coordinates(&self) -> Vec<LatLng> {
        self.records.iter().map(AddressRecord::coordinate).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeRecord {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Set only when the postcode has been retired.
    pub terminated: Option<String>,
}

impl PostcodeRecord {
    pub fn coordinate(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn is_active(&self) -> bool {
        self.terminated.is_none()
    }
}
