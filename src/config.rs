use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::distance::Metric;
use crate::error::Result;
use crate::nearest::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressColumns {
    pub id: String,
    pub latitude: String,
    pub longitude: String,
    pub location: String,
}

impl Default for AddressColumns {
    fn default() -> Self {
        Self {
            id: "Id".to_owned(),
            latitude: "Latitude".to_owned(),
            longitude: "Longitude".to_owned(),
            location: "Location".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostcodeColumns {
    pub postcode: String,
    /// Empty when the postcode is still in use.
    pub terminated: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for PostcodeColumns {
    fn default() -> Self {
        Self {
            postcode: "Postcode".to_owned(),
            terminated: "Terminated".to_owned(),
            latitude: "Latitude".to_owned(),
            longitude: "Longitude".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    pub address_path: PathBuf,
    pub postcode_path: PathBuf,
    pub output_path: PathBuf,
    pub metric: Metric,
    pub chunk_size: usize,
    /// Spread chunks over the rayon pool.
    pub parallel: bool,
    pub address_columns: AddressColumns,
    pub postcode_columns: PostcodeColumns,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            address_path: PathBuf::from("./data/address_list.csv"),
            postcode_path: PathBuf::from("./data/postcode_reference.csv"),
            output_path: PathBuf::from("./data/address_list.tsv"),
            metric: Metric::Planar,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: false,
            address_columns: AddressColumns::default(),
            postcode_columns: PostcodeColumns::default(),
        }
    }
}

impl JoinConfig {
    /// Reads a JSON config. Missing keys fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
