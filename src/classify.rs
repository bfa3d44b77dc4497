use crate::dataset::{Column, ColumnKind, Dataset};
use arrow::datatypes::DataType;

/// Tags every column with its kind. The identifier-keyword check runs before
/// type inspection, so a numeric-looking "student_id" is still an identifier.
/// Columns that are neither identifiers nor numerically stored default to
/// categorical.
pub fn classify(dataset: &Dataset, identifier_keywords: &[String]) -> Dataset {
    let columns = dataset
        .columns()
        .iter()
        .map(|column| Column {
            name: column.name.clone(),
            kind: classify_column(&column.name, column.data.data_type(), identifier_keywords),
            data: column.data.clone(),
        })
        .collect();

    // Renaming never happens here, so the dataset invariants still hold.
    Dataset::new(columns).expect("classification preserves dataset shape")
}

fn classify_column(name: &str, data_type: &DataType, identifier_keywords: &[String]) -> ColumnKind {
    let lowered = name.to_lowercase();
    if identifier_keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    {
        return ColumnKind::Identifier;
    }

    match data_type {
        DataType::Int64 | DataType::Float64 => ColumnKind::Numeric,
        _ => ColumnKind::Categorical,
    }
}
