use crate::{
    dataset::{Column, Dataset},
    error::{DatasetLoadError, Error},
};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use std::{fs::File, io, path::Path, sync::Arc};

/// Reads a CSV document with a header row into a typed dataset.
///
/// Per-column inference: a column whose every non-empty cell parses as an
/// integer becomes `Int64`, else as a float becomes `Float64`, otherwise it
/// stays `Utf8`. Empty cells are nulls; a column with no values at all stays
/// `Utf8`.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Dataset, DatasetLoadError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DatasetLoadError::Empty);
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (index, cell) in cells.iter_mut().enumerate() {
            let raw = record.get(index).unwrap_or("").trim();
            cell.push(if raw.is_empty() {
                None
            } else {
                Some(raw.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, infer_array(&values)))
        .collect();

    // Loader output always satisfies the dataset invariants; surface an
    // internal inconsistency as a load error rather than panicking.
    Dataset::new(columns).map_err(|err| {
        DatasetLoadError::Io(io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
    })
}

pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetLoadError> {
    let file = File::open(path)?;
    read_csv(file)
}

fn infer_array(values: &[Option<String>]) -> ArrayRef {
    let non_null: Vec<&str> = values.iter().flatten().map(String::as_str).collect();

    if !non_null.is_empty() && non_null.iter().all(|v| v.parse::<i64>().is_ok()) {
        let parsed: Int64Array = values
            .iter()
            .map(|v| v.as_ref().map(|s| s.parse::<i64>().unwrap()))
            .collect();
        return Arc::new(parsed);
    }

    if !non_null.is_empty() && non_null.iter().all(|v| v.parse::<f64>().is_ok()) {
        let parsed: Float64Array = values
            .iter()
            .map(|v| v.as_ref().map(|s| s.parse::<f64>().unwrap()))
            .collect();
        return Arc::new(parsed);
    }

    let strings: StringArray = values.iter().map(|v| v.as_deref()).collect();
    Arc::new(strings)
}

/// Writes a dataset back out as CSV, nulls as empty cells.
pub fn write_csv<W: io::Write>(dataset: &Dataset, writer: W) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(dataset.column_names())
        .map_err(DatasetLoadError::from)?;

    for row in 0..dataset.num_rows() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| column.value_to_string(row))
            .collect();
        writer.write_record(&record).map_err(DatasetLoadError::from)?;
    }

    writer.flush().map_err(DatasetLoadError::from)?;

    Ok(())
}
