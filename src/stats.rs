use crate::dataset::{Column, ColumnKind, Dataset};
use arrow::{
    array::{Float64Array, Int64Array, StringArray},
    datatypes::DataType,
};
use tracing::warn;

/// Describe-style summary of one numeric column: count of non-null values,
/// mean, sample standard deviation, min, quartiles and max.
#[derive(Debug, Clone)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Fallback row used when a dataset has no usable numeric column.
#[derive(Debug, Clone)]
pub struct ColumnOverview {
    pub column: String,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub nulls: usize,
}

#[derive(Debug, Clone)]
pub enum StatsTable {
    Numeric(Vec<NumericSummary>),
    Overview(Vec<ColumnOverview>),
}

/// Summary statistics over the numeric columns; if none yields a summary
/// (no numeric columns, or all of them degenerate) the table degrades to a
/// per-column overview instead of failing the report.
pub fn basic_stats(dataset: &Dataset) -> StatsTable {
    let mut summaries = Vec::new();

    for column in dataset.columns() {
        if !matches!(
            column.data.data_type(),
            DataType::Int64 | DataType::Float64
        ) {
            continue;
        }

        match numeric_summary(column) {
            Some(summary) => summaries.push(summary),
            None => warn!(
                "column '{}' has no non-null values, excluded from the numeric summary",
                column.name
            ),
        }
    }

    if summaries.is_empty() {
        StatsTable::Overview(
            dataset
                .columns()
                .iter()
                .map(|column| ColumnOverview {
                    column: column.name.clone(),
                    kind: column.kind,
                    non_null: column.len() - column.null_count(),
                    nulls: column.null_count(),
                })
                .collect(),
        )
    } else {
        StatsTable::Numeric(summaries)
    }
}

fn numeric_summary(column: &Column) -> Option<NumericSummary> {
    let mut values: Vec<f64> = numeric_view(column)
        .into_iter()
        .filter(|v| !v.is_nan())
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN values are comparable"));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = if count < 2 {
        f64::NAN
    } else {
        let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (squared / (count - 1) as f64).sqrt()
    };

    Some(NumericSummary {
        column: column.name.clone(),
        count,
        mean,
        std_dev,
        min: values[0],
        q25: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q75: percentile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolation percentile over sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let position = q * (sorted.len() - 1) as f64;
    let base = position.floor() as usize;
    let fraction = position - base as f64;

    if base + 1 < sorted.len() {
        sorted[base] + fraction * (sorted[base + 1] - sorted[base])
    } else {
        sorted[base]
    }
}

/// Row-aligned numeric view of any column: numeric values as-is, categorical
/// tokens lexically coerced, everything unparseable or null as NaN.
pub fn numeric_view(column: &Column) -> Vec<f64> {
    match column.data.data_type() {
        DataType::Int64 => column
            .data
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or_else(Vec::new, |array| {
                array
                    .iter()
                    .map(|v| v.map_or(f64::NAN, |v| v as f64))
                    .collect()
            }),
        DataType::Float64 => column
            .data
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or_else(Vec::new, |array| {
                array.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
            }),
        DataType::Utf8 => column
            .data
            .as_any()
            .downcast_ref::<StringArray>()
            .map_or_else(Vec::new, |array| {
                array
                    .iter()
                    .map(|v| {
                        v.and_then(|s| s.parse::<f64>().ok())
                            .unwrap_or(f64::NAN)
                    })
                    .collect()
            }),
        _ => vec![f64::NAN; column.len()],
    }
}

pub fn missing_fraction(view: &[f64]) -> f64 {
    if view.is_empty() {
        return 1.0;
    }
    view.iter().filter(|v| v.is_nan()).count() as f64 / view.len() as f64
}

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Pairwise-complete Pearson correlation over the given views. Returns
/// nothing when fewer than two columns are available.
pub fn correlation_matrix(views: &[(String, Vec<f64>)]) -> Option<CorrelationMatrix> {
    if views.len() < 2 {
        return None;
    }

    let values = views
        .iter()
        .map(|(_, x)| views.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();

    Some(CorrelationMatrix {
        columns: views.iter().map(|(name, _)| name.clone()).collect(),
        values,
    })
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (a, b) in &pairs {
        covariance += (a - mean_x) * (b - mean_y);
        variance_x += (a - mean_x).powi(2);
        variance_y += (b - mean_y).powi(2);
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        f64::NAN
    } else {
        covariance / denominator
    }
}
