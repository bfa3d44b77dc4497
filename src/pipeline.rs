use crate::{
    classify::classify,
    column_transformations::{ColumnTransformation, LaplaceNoise, RankBucket, SuppressRare},
    config::PrivacyConfig,
    dataset::{Column, ColumnKind, Dataset},
    error::Error,
};
use arrow::datatypes::DataType;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

/// Categorical columns with more distinct values than this are too
/// fine-grained to generalize usefully.
const GENERALIZATION_CARDINALITY_LIMIT: usize = 20;

/// Rare-value suppression only applies below this cardinality. Columns
/// between the two limits are classified as candidates but receive no
/// generalization; see DESIGN.md.
const SUPPRESSION_CARDINALITY_LIMIT: usize = 10;

const SUPPRESSION_MIN_SHARE: f64 = 0.05;

pub struct AnonymizationResult {
    pub dataset: Dataset,
    pub removed_columns: Vec<String>,
    pub generalized_columns: Vec<String>,
}

/// Anonymizes a dataset with a generator built from the config seed. The
/// input is never mutated; callers keep the original for comparison.
pub fn anonymize(dataset: &Dataset, config: &PrivacyConfig) -> Result<AnonymizationResult, Error> {
    let mut rng = config.rng();
    anonymize_with_rng(dataset, config, &mut rng)
}

/// Classifies every column, drops identifiers, perturbs numeric columns and
/// generalizes categorical ones, in that fixed order. Deterministic for a
/// fixed generator.
pub fn anonymize_with_rng<R: Rng>(
    dataset: &Dataset,
    config: &PrivacyConfig,
    rng: &mut R,
) -> Result<AnonymizationResult, Error> {
    config.validate()?;

    let classified = classify(dataset, &config.identifier_keywords);

    let mut removed_columns = Vec::new();
    let mut generalized_columns = Vec::new();
    let mut columns = Vec::new();

    for column in classified.columns() {
        match column.kind {
            ColumnKind::Identifier => {
                info!(
                    "dropped column '{}': name matches an identifier keyword",
                    column.name
                );
                removed_columns.push(column.name.clone());
            }
            ColumnKind::Numeric => {
                let transformation = LaplaceNoise {
                    epsilon: config.epsilon,
                };
                transformation.output_format(column.data.data_type())?;
                let data = transformation.transform_data(column.data.clone(), rng)?;
                columns.push(Column {
                    name: column.name.clone(),
                    kind: ColumnKind::Numeric,
                    data,
                });
            }
            ColumnKind::Categorical => match generalization_for(column) {
                Some(transformation) => {
                    transformation.output_format(column.data.data_type())?;
                    let data = transformation.transform_data(column.data.clone(), rng)?;
                    // Transformations hand the input back untouched when
                    // there is nothing to do.
                    if !Arc::ptr_eq(&column.data, &data) {
                        debug!("generalized column '{}'", column.name);
                        generalized_columns.push(column.name.clone());
                    }
                    columns.push(Column {
                        name: column.name.clone(),
                        kind: ColumnKind::Categorical,
                        data,
                    });
                }
                None => columns.push(column.clone()),
            },
        }
    }

    Ok(AnonymizationResult {
        dataset: Dataset::new(columns)?,
        removed_columns,
        generalized_columns,
    })
}

fn generalization_for(column: &Column) -> Option<Box<dyn ColumnTransformation>> {
    if column.data.data_type() != &DataType::Utf8 {
        return None;
    }

    if column.name.to_lowercase().contains("rank") {
        return Some(Box::new(RankBucket {}));
    }

    let cardinality = column.distinct_non_null();
    if cardinality == 0 || cardinality > GENERALIZATION_CARDINALITY_LIMIT {
        return None;
    }

    if cardinality <= SUPPRESSION_CARDINALITY_LIMIT {
        return Some(Box::new(SuppressRare {
            min_share: SUPPRESSION_MIN_SHARE,
        }));
    }

    // Cardinality 11..=20: a generalization candidate that no strategy
    // covers. Kept as-is until product intent is clarified.
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "student_id",
                Arc::new(Int64Array::from((1..=100i64).collect::<Vec<i64>>())) as ArrayRef,
            ),
            Column::new(
                "age",
                Arc::new(Int64Array::from(
                    (0..100i64).map(|i| 18 + (i % 13)).collect::<Vec<i64>>(),
                )) as ArrayRef,
            ),
            Column::new(
                "city",
                Arc::new(
                    (0..100)
                        .map(|i| {
                            if i < 3 {
                                Some("aachen".to_string())
                            } else {
                                Some(format!("city_{}", i % 7))
                            }
                        })
                        .collect::<StringArray>(),
                ) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn identifier_columns_never_survive() {
        let result = anonymize(&sample_dataset(), &PrivacyConfig::default()).unwrap();

        assert_eq!(vec!["age", "city"], result.dataset.column_names());
        assert_eq!(vec!["student_id".to_string()], result.removed_columns);
    }

    #[test]
    fn row_count_is_invariant() {
        let dataset = sample_dataset();
        let result = anonymize(&dataset, &PrivacyConfig::default()).unwrap();

        assert_eq!(dataset.num_rows(), result.dataset.num_rows());
    }

    #[test]
    fn input_dataset_is_left_untouched() {
        let dataset = sample_dataset();
        let _ = anonymize(&dataset, &PrivacyConfig::default()).unwrap();

        assert_eq!(vec!["student_id", "age", "city"], dataset.column_names());
    }

    #[test]
    fn invalid_epsilon_fails_before_any_transform() {
        let result = anonymize(&sample_dataset(), &PrivacyConfig::with_epsilon(0.0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result = anonymize(&sample_dataset(), &PrivacyConfig::with_epsilon(-2.0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn anonymization_is_idempotent_for_identifier_removal() {
        let config = PrivacyConfig::default();
        let first = anonymize(&sample_dataset(), &config).unwrap();
        let second = anonymize(&first.dataset, &config).unwrap();

        assert!(second.removed_columns.is_empty());
        assert_eq!(first.dataset.column_names(), second.dataset.column_names());
    }

    #[test]
    fn same_seed_yields_identical_output() {
        let config = PrivacyConfig {
            seed: Some(1234),
            ..PrivacyConfig::default()
        };

        let a = anonymize(&sample_dataset(), &config).unwrap();
        let b = anonymize(&sample_dataset(), &config).unwrap();

        let ages = |result: &AnonymizationResult| -> Vec<Option<i64>> {
            result
                .dataset
                .column("age")
                .unwrap()
                .data
                .as_any()
                .downcast_ref::<Int64Array>()
                .unwrap()
                .iter()
                .collect()
        };

        assert_eq!(ages(&a), ages(&b));
    }

    #[test]
    fn rare_city_is_suppressed() {
        let result = anonymize(&sample_dataset(), &PrivacyConfig::default()).unwrap();

        let city = result.dataset.column("city").unwrap();
        let values: Vec<Option<&str>> = city
            .data
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .collect();

        // "aachen" appears 3 times in 100 rows (3% < 5%).
        assert_eq!(3, values.iter().filter(|v| **v == Some("Other")).count());
        assert!(values.iter().all(|v| *v != Some("aachen")));
        assert_eq!(vec!["city".to_string()], result.generalized_columns);
    }

    #[test]
    fn mid_cardinality_categoricals_are_a_documented_no_op() {
        // 15 distinct values in 100 rows, one of them rare (2% < 5%). With
        // cardinality between 11 and 20 no generalization strategy applies.
        let values: Vec<String> = (0..100)
            .map(|i| {
                if i < 2 {
                    "rare".to_string()
                } else {
                    format!("v{}", i % 14)
                }
            })
            .collect();

        let dataset = Dataset::new(vec![Column::new(
            "grade_band",
            Arc::new(values.iter().map(|v| Some(v.as_str())).collect::<StringArray>()) as ArrayRef,
        )])
        .unwrap();

        let result = anonymize(&dataset, &PrivacyConfig::default()).unwrap();

        let column = result.dataset.column("grade_band").unwrap();
        assert_eq!(2, column.data.as_any().downcast_ref::<StringArray>().unwrap()
            .iter()
            .filter(|v| *v == Some("rare"))
            .count());
        assert!(result.generalized_columns.is_empty());
    }

    #[test]
    fn high_cardinality_categoricals_are_untouched() {
        let values: Vec<String> = (0..100).map(|i| format!("v{}", i % 25)).collect();

        let dataset = Dataset::new(vec![Column::new(
            "course",
            Arc::new(values.iter().map(|v| Some(v.as_str())).collect::<StringArray>()) as ArrayRef,
        )])
        .unwrap();

        let result = anonymize(&dataset, &PrivacyConfig::default()).unwrap();
        assert!(result.generalized_columns.is_empty());
        assert_eq!(25, result.dataset.column("course").unwrap().distinct_non_null());
    }

    #[test]
    fn rank_columns_are_bucketed_even_at_high_cardinality() {
        let values: Vec<String> = (0..100).map(|i| format!("{:03}", i)).collect();

        let dataset = Dataset::new(vec![Column::new(
            "exam_rank",
            Arc::new(values.iter().map(|v| Some(v.as_str())).collect::<StringArray>()) as ArrayRef,
        )])
        .unwrap();

        let result = anonymize(&dataset, &PrivacyConfig::default()).unwrap();

        let column = result.dataset.column("exam_rank").unwrap();
        assert_eq!(5, column.distinct_non_null());
        assert_eq!(vec!["exam_rank".to_string()], result.generalized_columns);
    }
}
