use tracing::info;

use crate::error::{JoinError, Result};
use crate::records::{LatLng, PostcodeRecord};

/// Active postcodes only. Its ordering is the column space of every distance
/// matrix, so it is built once and never changed.
#[derive(Debug, Clone)]
pub struct ActiveGazetteer {
    postcodes: Vec<PostcodeRecord>,
    coordinates: Vec<LatLng>,
}

impl ActiveGazetteer {
    pub fn len(&self) -> usize {
        self.postcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postcodes.is_empty()
    }

    pub fn postcodes(&self) -> &[PostcodeRecord] {
        &self.postcodes
    }

    pub fn coordinates(&self) -> &[LatLng] {
        &self.coordinates
    }

    pub fn code(&self, idx: usize) -> &str {
        &self.postcodes[idx].code
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            Err(JoinError::NoActivePostcodes)
        } else {
            Ok(())
        }
    }
}

/// Drops retired postcodes. The input is left untouched.
pub fn filter_active(postcodes: &[PostcodeRecord]) -> ActiveGazetteer {
    let postcodes: Vec<PostcodeRecord> = postcodes
        .iter()
        .filter(|p| p.is_active())
        .cloned()
        .collect();
    let coordinates = postcodes.iter().map(PostcodeRecord::coordinate).collect();

    info!(active = postcodes.len(), "filtered postcode reference");
    ActiveGazetteer { postcodes, coordinates }
}
