//! Nearest-postcode matching for geocoded address lists.
//!
//! Each address is joined to the closest active postcode of a reference
//! gazetteer, then cross-checked against the postcode written in its free-text
//! location.

pub mod config;
pub mod distance;
pub mod error;
pub mod extract;
pub mod filter;
pub mod io;
pub mod joiner;
pub mod nearest;
pub mod records;
pub mod validate;

pub use config::{AddressColumns, JoinConfig, PostcodeColumns};
pub use distance::{haversine_distance, planar_distance, DistanceMatrix, Metric};
pub use error::{JoinError, Result};
pub use extract::{PostcodeExtractor, POSTCODE_PATTERN};
pub use filter::{filter_active, ActiveGazetteer};
pub use joiner::{JoinOutcome, PostcodeJoiner};
pub use nearest::DEFAULT_CHUNK_SIZE;
pub use records::{AddressRecord, AddressTable, LatLng, PostcodeRecord};
pub use validate::validate_postcodes;
