use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::core_logic::procurement::PurchaseDecision;
use crate::errors::EngineError;
use crate::storage::models::ProductRecord;

/// Reads product demand rows from any CSV source, validating each row
/// and rejecting duplicate product ids.
///
/// A malformed row is an invalid-record error attributed to its line
/// and product id; reader-level failures stay csv errors.
pub fn load_product_records<R: Read>(reader: R) -> Result<Vec<ProductRecord>, EngineError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let id_index = headers.iter().position(|name| name == "ProductID");

    let mut records = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for row in csv_reader.records() {
        let row = row?;
        let record: ProductRecord = match row.deserialize(Some(&headers)) {
            Ok(record) => record,
            Err(error) => return Err(invalid_row(&row, id_index, &error)),
        };
        record
            .validate()
            .map_err(|reason| EngineError::invalid_record(&record.product_id, reason))?;
        if !seen_ids.insert(record.product_id.clone()) {
            return Err(EngineError::invalid_record(
                &record.product_id,
                "duplicate ProductID",
            ));
        }
        records.push(record);
    }

    Ok(records)
}

fn invalid_row(row: &StringRecord, id_index: Option<usize>, error: &csv::Error) -> EngineError {
    let product_id = id_index
        .and_then(|index| row.get(index))
        .unwrap_or_default()
        .to_string();
    let line = row
        .position()
        .map(|position| position.line().to_string())
        .unwrap_or_else(|| "?".to_string());
    let reason = match error.kind() {
        csv::ErrorKind::Deserialize { err, .. } => format!("line {line}: {err}"),
        _ => format!("line {line}: {error}"),
    };
    EngineError::InvalidRecord { product_id, reason }
}

pub fn load_product_records_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ProductRecord>, EngineError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| EngineError::File {
        path: path.to_path_buf(),
        source,
    })?;
    load_product_records(file)
}

/// Writes the purchase report rows in the order they are given.
pub fn write_purchase_report<W: Write>(
    writer: W,
    decisions: &[PurchaseDecision],
) -> Result<(), EngineError> {
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for decision in decisions {
        csv_writer.serialize(decision)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_purchase_report_file<P: AsRef<Path>>(
    path: P,
    decisions: &[PurchaseDecision],
) -> Result<(), EngineError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| EngineError::File {
        path: path.to_path_buf(),
        source,
    })?;
    write_purchase_report(file, decisions)
}
