use crate::error::Error;
use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::DataType,
};
use itertools::Itertools;

/// Kind assigned by the classifier. Identifier columns are dropped by the
/// pipeline before any value-level transformation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Identifier,
    Numeric,
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Identifier => write!(f, "identifier"),
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub data: ArrayRef,
}

impl Column {
    /// Builds a column with the kind implied by its storage type. The
    /// classifier may later retag it as an identifier based on its name.
    pub fn new(name: impl Into<String>, data: ArrayRef) -> Self {
        let kind = match data.data_type() {
            DataType::Int64 | DataType::Float64 => ColumnKind::Numeric,
            _ => ColumnKind::Categorical,
        };

        Self {
            name: name.into(),
            kind,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    /// Number of distinct non-null values.
    pub fn distinct_non_null(&self) -> usize {
        match self.data.data_type() {
            DataType::Utf8 => self
                .data
                .as_any()
                .downcast_ref::<StringArray>()
                .map_or(0, |array| array.iter().flatten().unique().count()),
            DataType::Int64 => self
                .data
                .as_any()
                .downcast_ref::<Int64Array>()
                .map_or(0, |array| array.iter().flatten().unique().count()),
            DataType::Float64 => self
                .data
                .as_any()
                .downcast_ref::<Float64Array>()
                .map_or(0, |array| {
                    array.iter().flatten().map(f64::to_bits).unique().count()
                }),
            _ => 0,
        }
    }

    /// Display form of a single cell; nulls render as the empty string.
    pub fn value_to_string(&self, row: usize) -> String {
        if self.data.is_null(row) {
            return String::new();
        }

        match self.data.data_type() {
            DataType::Int64 => self
                .data
                .as_any()
                .downcast_ref::<Int64Array>()
                .map_or_else(String::new, |array| array.value(row).to_string()),
            DataType::Float64 => self
                .data
                .as_any()
                .downcast_ref::<Float64Array>()
                .map_or_else(String::new, |array| array.value(row).to_string()),
            DataType::Utf8 => self
                .data
                .as_any()
                .downcast_ref::<StringArray>()
                .map_or_else(String::new, |array| array.value(row).to_string()),
            _ => String::new(),
        }
    }
}

/// An ordered sequence of named columns sharing one row count.
#[derive(Clone)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, Error> {
        let expected = columns.first().map_or(0, Column::len);

        for column in &columns {
            if column.len() != expected {
                return Err(Error::MismatchedRowCount {
                    column: column.name.clone(),
                    expected,
                    got: column.len(),
                });
            }
        }

        if let Some(name) = columns.iter().map(|c| c.name.as_str()).duplicates().next() {
            return Err(Error::DuplicateColumn(name.to_string()));
        }

        Ok(Self { columns })
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First `n` rows rendered as strings, for result previews.
    pub fn preview(&self, n: usize) -> TablePreview {
        let rows = (0..self.num_rows().min(n))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| column.value_to_string(row))
                    .collect()
            })
            .collect();

        TablePreview {
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            rows,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
