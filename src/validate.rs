use itertools::Itertools;
use tracing::info;

/// True only when both sides are present and equal.
pub fn postcodes_agree(extracted: Option<&str>, inferred: Option<&str>) -> bool {
    match (extracted, inferred) {
        (Some(e), Some(i)) => e == i,
        _ => false,
    }
}

/// Row-wise agreement between regex-extracted and nearest-match postcodes.
pub fn validate_postcodes(extracted: &[Option<String>], inferred: &[Option<String>]) -> Vec<bool> {
    assert_eq!(
        extracted.len(),
        inferred.len(),
        "extracted and inferred postcodes must be row aligned"
    );

    let flags = extracted
        .iter()
        .zip_eq(inferred)
        .map(|(e, i)| postcodes_agree(e.as_deref(), i.as_deref()))
        .collect_vec();

    info!(
        rows = flags.len(),
        validated = flags.iter().filter(|&&v| v).count(),
        "cross-validated postcodes"
    );
    flags
}
