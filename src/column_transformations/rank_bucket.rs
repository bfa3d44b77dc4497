use super::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult,
};
use arrow::{
    array::{Array, ArrayRef, StringArray},
    datatypes::DataType,
};
use rand::RngCore;
use std::sync::Arc;

/// Bucket labels in ascending rank order; the lowest-ranked fifth becomes
/// "Top 20%".
pub const RANK_BUCKET_LABELS: [&str; 5] = ["Top 20%", "20-40%", "40-60%", "60-80%", "Bottom 20%"];

/// Replaces a rank-like column with equal-size quantile buckets. Rows are
/// ranked by value (ties broken by first appearance) and each row gets the
/// label of its rank's fifth. With fewer non-null rows than buckets the
/// bucketing degrades to fewer labels, each still reflecting relative
/// position; nulls stay null.
pub struct RankBucket {}

impl ColumnTransformation for RankBucket {
    fn transform_data(
        &self,
        data: ArrayRef,
        _rng: &mut dyn RngCore,
    ) -> ColumnTransformationResult<ArrayRef> {
        match data.data_type() {
            DataType::Utf8 => {
                let array = data
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or(ColumnTransformationError::DowncastFailed)?;

                let mut order: Vec<(usize, &str)> = array
                    .iter()
                    .enumerate()
                    .filter_map(|(row, value)| value.map(|v| (row, v)))
                    .collect();
                if order.is_empty() {
                    return Ok(data);
                }
                // Stable sort keeps ties in first-seen order.
                order.sort_by_key(|entry| entry.1);

                let mut labels: Vec<Option<&str>> = vec![None; array.len()];
                for (rank, (row, _)) in order.iter().enumerate() {
                    let bucket = rank * RANK_BUCKET_LABELS.len() / order.len();
                    labels[*row] = Some(RANK_BUCKET_LABELS[bucket]);
                }

                Ok(Arc::new(labels.into_iter().collect::<StringArray>()))
            }
            other => Err(ColumnTransformationError::UnsupportedType(other.clone())),
        }
    }

    fn output_format(
        &self,
        input: &DataType,
    ) -> ColumnTransformationResult<ColumnTransformationOutput> {
        match input {
            DataType::Utf8 => Ok(ColumnTransformationOutput {
                data_type: DataType::Utf8,
                nullable: true,
            }),
            other => Err(ColumnTransformationError::UnsupportedType(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{rngs::StdRng, SeedableRng};

    fn bucket(values: Vec<Option<&str>>) -> Vec<Option<String>> {
        let transformation = RankBucket {};
        let mut rng = StdRng::seed_from_u64(0);

        let result = transformation
            .transform_data(Arc::new(StringArray::from(values)) as ArrayRef, &mut rng)
            .unwrap();

        result
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn hundred_distinct_values_fill_five_even_buckets() {
        let values: Vec<String> = (0..100).map(|i| format!("{:03}", i)).collect();
        let result = bucket(values.iter().map(|v| Some(v.as_str())).collect());

        let counts = result.iter().flatten().counts();
        assert_eq!(5, counts.len());
        for label in &RANK_BUCKET_LABELS {
            assert_eq!(Some(&20usize), counts.get(&label.to_string()));
        }

        // Lowest ranks land in the first bucket, highest in the last.
        assert_eq!(Some("Top 20%".to_string()), result[0]);
        assert_eq!(Some("Bottom 20%".to_string()), result[99]);
    }

    #[test]
    fn fewer_rows_than_buckets_degrade_to_fewer_labels() {
        let result = bucket(vec![Some("a"), Some("b"), Some("c")]);

        assert_eq!(
            vec![
                Some("Top 20%".to_string()),
                Some("20-40%".to_string()),
                Some("60-80%".to_string()),
            ],
            result
        );
    }

    #[test]
    fn ties_break_by_first_appearance() {
        let result = bucket(vec![Some("b"), Some("a"), Some("b")]);

        assert_eq!(
            vec![
                Some("20-40%".to_string()),
                Some("Top 20%".to_string()),
                Some("60-80%".to_string()),
            ],
            result
        );
    }

    #[test]
    fn nulls_stay_null() {
        let result = bucket(vec![Some("a"), None, Some("b")]);
        assert_eq!(None, result[1]);
    }

    #[test]
    fn numeric_input_is_unsupported() {
        use arrow::array::Int64Array;

        let transformation = RankBucket {};
        let mut rng = StdRng::seed_from_u64(0);

        let result = transformation.transform_data(
            Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
            &mut rng,
        );

        assert!(matches!(
            result,
            Err(ColumnTransformationError::UnsupportedType(_))
        ));
    }
}
