use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use crate::distance::{DistanceMatrix, Metric};
use crate::error::{JoinError, Result};
use crate::filter::ActiveGazetteer;
use crate::records::LatLng;

pub const DEFAULT_CHUNK_SIZE: usize = 5000;

/// Column of the smallest distance in each row.
///
/// NaN cells are skipped and ties resolve to the lowest column. A row that is
/// NaN everywhere has no nearest postcode and yields `None`.
pub fn nearest_per_row(distances: &DistanceMatrix) -> Vec<Option<usize>> {
    distances
        .row_iter()
        .map(|row| {
            let mut best: Option<(usize, f64)> = None;
            for (j, &d) in row.iter().enumerate() {
                if d.is_nan() {
                    continue;
                }
                if best.map(|(_, b)| d < b).unwrap_or(true) {
                    best = Some((j, d));
                }
            }
            best.map(|(j, _)| j)
        })
        .collect()
}

/// Consecutive row ranges of at most `chunk_size` covering `0..len`.
pub fn chunk_ranges(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    assert!(chunk_size > 0, "chunk size must be positive");
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}

/// Computes one chunk's matrix, reduces it and lets it drop.
fn nearest_in_chunk(
    metric: Metric,
    chunk: &[LatLng],
    gazetteer: &ActiveGazetteer,
) -> Vec<Option<usize>> {
    let distances = metric.matrix(chunk, gazetteer.coordinates());
    nearest_per_row(&distances)
}

fn check_preconditions(gazetteer: &ActiveGazetteer, chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(JoinError::InvalidChunkSize);
    }
    gazetteer.ensure_not_empty()
}

/// Nearest active postcode index for every address, aligned with `addresses`.
///
/// Chunking only bounds memory to `chunk_size * gazetteer.len()` cells; the
/// result is the same for every chunk size.
pub fn compute_in_chunks(
    addresses: &[LatLng],
    gazetteer: &ActiveGazetteer,
    metric: Metric,
    chunk_size: usize,
) -> Result<Vec<Option<usize>>> {
    check_preconditions(gazetteer, chunk_size)?;

    let ranges = chunk_ranges(addresses.len(), chunk_size);
    let n_chunks = ranges.len();

    let nearest = ranges
        .into_iter()
        .enumerate()
        .fold(Vec::with_capacity(addresses.len()), |mut acc, (i, range)| {
            debug!(chunk = i + 1, of = n_chunks, rows = range.len(), %metric, "computing chunk");
            acc.extend(nearest_in_chunk(metric, &addresses[range], gazetteer));
            acc
        });

    Ok(nearest)
}

/// Same as [`compute_in_chunks`] with chunks spread over the rayon pool.
/// Chunk results are merged back in chunk order.
pub fn compute_in_chunks_par(
    addresses: &[LatLng],
    gazetteer: &ActiveGazetteer,
    metric: Metric,
    chunk_size: usize,
) -> Result<Vec<Option<usize>>> {
    check_preconditions(gazetteer, chunk_size)?;

    let per_chunk: Vec<Vec<Option<usize>>> = addresses
        .par_chunks(chunk_size)
        .map(|chunk| nearest_in_chunk(metric, chunk, gazetteer))
        .collect();

    Ok(per_chunk.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_active;
    use crate::records::PostcodeRecord;

    fn gazetteer(points: &[(f64, f64)]) -> ActiveGazetteer {
        let records: Vec<PostcodeRecord> = points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lng))| PostcodeRecord {
                code: format!("P{}", i),
                latitude: lat,
                longitude: lng,
                terminated: None,
            })
            .collect();
        filter_active(&records)
    }

    fn scattered_addresses(n: usize) -> Vec<LatLng> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                LatLng::new(51.5 + (t * 0.0137) % 0.2, -0.1 + (t * 0.0291) % 0.3)
            })
            .collect()
    }

    #[test]
    fn picks_minimum_column() {
        let m = DistanceMatrix::from_row_slice(2, 3, &[3.0, 1.0, 2.0, 0.5, 4.0, 0.7]);
        assert_eq!(nearest_per_row(&m), vec![Some(1), Some(0)]);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let m = DistanceMatrix::from_row_slice(1, 4, &[2.0, 1.0, 1.0, 1.0]);
        assert_eq!(nearest_per_row(&m), vec![Some(1)]);
    }

    #[test]
    fn nan_is_never_the_minimum() {
        let m = DistanceMatrix::from_row_slice(1, 3, &[f64::NAN, 5.0, f64::NAN]);
        assert_eq!(nearest_per_row(&m), vec![Some(1)]);
    }

    #[test]
    fn all_nan_row_has_no_match() {
        let m = DistanceMatrix::from_row_slice(2, 2, &[f64::NAN, f64::NAN, 1.0, 0.0]);
        assert_eq!(nearest_per_row(&m), vec![None, Some(1)]);
    }

    #[test]
    fn ranges_cover_everything_in_order() {
        assert_eq!(chunk_ranges(7, 3), vec![0..3, 3..6, 6..7]);
        assert_eq!(chunk_ranges(6, 3), vec![0..3, 3..6]);
        assert!(chunk_ranges(0, 3).is_empty());
    }

    #[test]
    fn equidistant_postcodes_select_lower_index() {
        // Mirror images across the address meridian.
        let gz = gazetteer(&[(51.60, 0.01), (51.60, 0.05), (51.60, -0.05)]);
        let address = [LatLng::new(51.60, 0.0)];
        for metric in [Metric::Geodesic, Metric::Planar] {
            for _ in 0..3 {
                let got = compute_in_chunks(&address, &gz, metric, 1).unwrap();
                assert_eq!(got, vec![Some(0)]);
            }
        }

        let tied = gazetteer(&[(51.60, 0.05), (51.60, -0.05)]);
        for metric in [Metric::Geodesic, Metric::Planar] {
            assert_eq!(compute_in_chunks(&address, &tied, metric, 10).unwrap(), vec![Some(0)]);
        }
    }

    #[test]
    fn chunk_size_does_not_change_result() {
        let gz = gazetteer(&[
            (51.52, -0.08),
            (51.55, 0.02),
            (51.61, 0.03),
            (51.58, 0.18),
            (51.65, -0.05),
            (51.57, 0.10),
        ]);
        let addresses = scattered_addresses(53);

        for metric in [Metric::Geodesic, Metric::Planar] {
            let reference = compute_in_chunks(&addresses, &gz, metric, 1).unwrap();
            assert_eq!(reference.len(), addresses.len());
            for size in [2, 5, 7, 52, 53, 1000] {
                assert_eq!(compute_in_chunks(&addresses, &gz, metric, size).unwrap(), reference);
                assert_eq!(
                    compute_in_chunks_par(&addresses, &gz, metric, size).unwrap(),
                    reference
                );
            }
        }
    }

    #[test]
    fn missing_coordinates_yield_no_match() {
        let gz = gazetteer(&[(51.61, 0.03), (51.58, 0.18)]);
        let addresses = [LatLng::new(51.6, 0.03), LatLng::new(f64::NAN, 0.1)];
        let got = compute_in_chunks(&addresses, &gz, Metric::Geodesic, 5000).unwrap();
        assert_eq!(got, vec![Some(0), None]);
    }

    #[test]
    fn infinite_coordinate_text_yields_no_match_for_both_metrics() {
        use crate::records::parse_coordinate;

        // Far candidate first: a wrong match would land on index 0.
        let gz = gazetteer(&[(10.0, 10.0), (51.6, 0.05)]);
        for raw in ["inf", "1e400"] {
            let addresses = [LatLng::new(parse_coordinate(raw), 0.05)];
            for metric in [Metric::Geodesic, Metric::Planar] {
                let got = compute_in_chunks(&addresses, &gz, metric, 10).unwrap();
                assert_eq!(got, vec![None], "{} under {}", raw, metric);
            }
        }
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let gz = gazetteer(&[(51.61, 0.03)]);
        let res = compute_in_chunks(&[LatLng::new(51.6, 0.0)], &gz, Metric::Planar, 0);
        assert!(matches!(res, Err(JoinError::InvalidChunkSize)));
    }

    #[test]
    fn empty_gazetteer_rejected_before_chunking() {
        let gz = gazetteer(&[]);
        let res = compute_in_chunks(&[LatLng::new(51.6, 0.0)], &gz, Metric::Planar, 10);
        assert!(matches!(res, Err(JoinError::NoActivePostcodes)));
        let res = compute_in_chunks_par(&[], &gz, Metric::Geodesic, 10);
        assert!(matches!(res, Err(JoinError::NoActivePostcodes)));
    }
}
