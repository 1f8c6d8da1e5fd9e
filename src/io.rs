use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use itertools::izip;
use tracing::{info, warn};

use crate::config::{AddressColumns, PostcodeColumns};
use crate::error::{JoinError, Result};
use crate::records::{parse_coordinate, AddressRecord, AddressTable, PostcodeRecord};

pub const NEAREST_HEADER: &str = "Postcode (nearest match)";
pub const VALIDATED_HEADER: &str = "Validated";

fn column_index(headers: &StringRecord, dataset: &'static str, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| JoinError::MissingColumn {
            dataset,
            column: column.to_owned(),
        })
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Reads the address list, keeping every column for export.
pub fn load_addresses<P: AsRef<Path>>(path: P, columns: &AddressColumns) -> Result<AddressTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path.as_ref())?;
    let headers = rdr.headers()?.clone();

    let id = column_index(&headers, "address", &columns.id)?;
    let lat = column_index(&headers, "address", &columns.latitude)?;
    let lng = column_index(&headers, "address", &columns.longitude)?;
    let location = column_index(&headers, "address", &columns.location)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");
        records.push(AddressRecord {
            id: field(id).to_owned(),
            latitude: parse_coordinate(field(lat)),
            longitude: parse_coordinate(field(lng)),
            location: non_empty(record.get(location)),
            values: record.iter().map(str::to_owned).collect(),
        });
    }

    let missing = records.iter().filter(|r| !r.has_coordinates()).count();
    if missing > 0 {
        warn!(missing, "addresses with unparseable coordinates");
    }
    info!(rows = records.len(), path = %path.as_ref().display(), "loaded addresses");

    Ok(AddressTable {
        headers: headers.iter().map(str::to_owned).collect(),
        records,
    })
}

/// Reads the full postcode reference, retired entries included.
pub fn load_postcodes<P: AsRef<Path>>(
    path: P,
    columns: &PostcodeColumns,
) -> Result<Vec<PostcodeRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path.as_ref())?;
    let headers = rdr.headers()?.clone();

    let code = column_index(&headers, "postcode", &columns.postcode)?;
    let terminated = column_index(&headers, "postcode", &columns.terminated)?;
    let lat = column_index(&headers, "postcode", &columns.latitude)?;
    let lng = column_index(&headers, "postcode", &columns.longitude)?;

    let mut postcodes = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");
        postcodes.push(PostcodeRecord {
            code: field(code).trim().to_owned(),
            latitude: parse_coordinate(field(lat)),
            longitude: parse_coordinate(field(lng)),
            terminated: non_empty(record.get(terminated)),
        });
    }

    info!(rows = postcodes.len(), path = %path.as_ref().display(), "loaded postcode reference");
    Ok(postcodes)
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Writes the addresses with the nearest postcode and validation flag appended,
/// tab separated, header first.
pub fn export_tsv<P: AsRef<Path>>(
    path: P,
    table: &AddressTable,
    nearest: &[Option<String>],
    validated: &[bool],
) -> Result<()> {
    assert_eq!(table.len(), nearest.len(), "nearest postcodes must align with addresses");
    assert_eq!(table.len(), validated.len(), "validation flags must align with addresses");

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_ref())?;

    let mut header = table.headers.clone();
    header.push(NEAREST_HEADER.to_owned());
    header.push(VALIDATED_HEADER.to_owned());
    writer.write_record(&header)?;

    for (record, postcode, valid) in izip!(&table.records, nearest, validated) {
        let mut row: Vec<&str> = record.values.iter().map(String::as_str).collect();
        row.push(postcode.as_deref().unwrap_or(""));
        row.push(flag(*valid));
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(path = %path.as_ref().display(), rows = table.len(), "tsv exported");
    Ok(())
}
