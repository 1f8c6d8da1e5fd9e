use tracing::{info, warn};

use crate::config::JoinConfig;
use crate::distance::Metric;
use crate::error::Result;
use crate::extract::PostcodeExtractor;
use crate::filter::{filter_active, ActiveGazetteer};
use crate::io::{export_tsv, load_addresses, load_postcodes};
use crate::nearest::{compute_in_chunks, compute_in_chunks_par};
use crate::records::{AddressTable, LatLng, PostcodeRecord};
use crate::validate::validate_postcodes;

/// Per-address results of one batch run, aligned with the address table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub inferred: Vec<Option<String>>,
    pub extracted: Vec<Option<String>>,
    pub validated: Vec<bool>,
}

impl JoinOutcome {
    pub fn validated_count(&self) -> usize {
        self.validated.iter().filter(|&&v| v).count()
    }
}

/// Joins addresses to their nearest active postcode and checks the result
/// against the postcode written in the address text.
pub struct PostcodeJoiner {
    addresses: AddressTable,
    coordinates: Vec<LatLng>,
    gazetteer: ActiveGazetteer,
    extractor: PostcodeExtractor,
    parallel: bool,
}

impl PostcodeJoiner {
    /// Retired postcodes are dropped here, once, before any distance is computed.
    pub fn new(addresses: AddressTable, postcodes: &[PostcodeRecord]) -> Self {
        let gazetteer = filter_active(postcodes);
        let retired = postcodes.len() - gazetteer.len();
        if retired > 0 {
            info!(retired, "dropped retired postcodes");
        }

        Self {
            coordinates: addresses.coordinates(),
            addresses,
            gazetteer,
            extractor: PostcodeExtractor::new(),
            parallel: false,
        }
    }

    pub fn load(config: &JoinConfig) -> Result<Self> {
        let addresses = load_addresses(&config.address_path, &config.address_columns)?;
        let postcodes = load_postcodes(&config.postcode_path, &config.postcode_columns)?;
        Ok(Self::new(addresses, &postcodes).with_parallel(config.parallel))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn addresses(&self) -> &AddressTable {
        &self.addresses
    }

    pub fn gazetteer(&self) -> &ActiveGazetteer {
        &self.gazetteer
    }

    /// Index into [`Self::gazetteer`] of the nearest postcode for each address.
    pub fn compute_in_chunks(&self, metric: Metric, chunk_size: usize) -> Result<Vec<Option<usize>>> {
        if self.parallel {
            compute_in_chunks_par(&self.coordinates, &self.gazetteer, metric, chunk_size)
        } else {
            compute_in_chunks(&self.coordinates, &self.gazetteer, metric, chunk_size)
        }
    }

    pub fn nearest_postcodes(&self, metric: Metric, chunk_size: usize) -> Result<Vec<Option<String>>> {
        let nearest = self.compute_in_chunks(metric, chunk_size)?;

        let unmatched = nearest.iter().filter(|i| i.is_none()).count();
        if unmatched > 0 {
            warn!(unmatched, "addresses without coordinates have no nearest postcode");
        }

        Ok(nearest
            .into_iter()
            .map(|idx| idx.map(|i| self.gazetteer.code(i).to_owned()))
            .collect())
    }

    /// Like [`Self::nearest_postcodes`] with the metric given by name
    /// (`geodesic`/`accuracy` or `planar`/`speed`).
    pub fn nearest_postcodes_for(&self, tradeoff: &str, chunk_size: usize) -> Result<Vec<Option<String>>> {
        let metric: Metric = tradeoff.parse()?;
        self.nearest_postcodes(metric, chunk_size)
    }

    pub fn extract_postcodes(&self) -> Vec<Option<String>> {
        self.extractor.extract_all(
            self.addresses
                .records
                .iter()
                .map(|r| r.location.as_deref()),
        )
    }

    /// Full batch: nearest match, extraction, validation and export.
    pub fn run(&self, config: &JoinConfig) -> Result<JoinOutcome> {
        info!(metric = %config.metric, chunk_size = config.chunk_size, parallel = self.parallel, "joining postcodes");

        let inferred = self.nearest_postcodes(config.metric, config.chunk_size)?;
        let extracted = self.extract_postcodes();
        let validated = validate_postcodes(&extracted, &inferred);

        export_tsv(&config.output_path, &self.addresses, &inferred, &validated)?;

        Ok(JoinOutcome {
            inferred,
            extracted,
            validated,
        })
    }
}
