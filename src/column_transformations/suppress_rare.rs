use super::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult,
};
use arrow::{
    array::{Array, ArrayRef, StringArray},
    datatypes::DataType,
};
use itertools::Itertools;
use rand::RngCore;
use std::{collections::HashSet, sync::Arc};

pub const OTHER_CATEGORY: &str = "Other";

/// k-anonymity style suppression: every value occurring in strictly fewer
/// than `min_share` of the rows collapses into the shared "Other" category.
/// The share is taken over the full row count, nulls included.
pub struct SuppressRare {
    pub min_share: f64,
}

impl ColumnTransformation for SuppressRare {
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

                let threshold = array.len() as f64 * self.min_share;

                let counts = array.iter().flatten().counts();
                let rare: HashSet<&str> = counts
                    .into_iter()
                    .filter(|(_, count)| (*count as f64) < threshold)
                    .map(|(value, _)| value)
                    .collect();

                if rare.is_empty() {
                    return Ok(data);
                }

                let suppressed: StringArray = array
                    .iter()
                    .map(|value| {
                        value.map(|v| if rare.contains(v) { OTHER_CATEGORY } else { v })
                    })
                    .collect();

                Ok(Arc::new(suppressed))
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
    use rand::{rngs::StdRng, SeedableRng};

    fn suppress(values: Vec<Option<&str>>) -> Vec<Option<String>> {
        let transformation = SuppressRare { min_share: 0.05 };
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
    fn values_below_five_percent_become_other() {
        // 100 rows: "berlin" 97 times, "aachen" 3 times (3% < 5%).
        let mut values = vec![Some("berlin"); 97];
        values.extend(vec![Some("aachen"); 3]);

        let result = suppress(values);

        assert_eq!(3, result.iter().filter(|v| v.as_deref() == Some("Other")).count());
        assert_eq!(
            97,
            result.iter().filter(|v| v.as_deref() == Some("berlin")).count()
        );
    }

    #[test]
    fn values_at_the_threshold_are_preserved() {
        // 100 rows: "hamburg" exactly 5 times (5% is not strictly below 5%).
        let mut values = vec![Some("berlin"); 95];
        values.extend(vec![Some("hamburg"); 5]);

        let result = suppress(values);

        assert!(result.iter().all(|v| v.as_deref() != Some("Other")));
    }

    #[test]
    fn nulls_are_left_alone() {
        let mut values = vec![Some("berlin"); 97];
        values.push(Some("aachen"));
        values.extend(vec![None; 2]);

        let result = suppress(values);

        assert_eq!(2, result.iter().filter(|v| v.is_none()).count());
        assert_eq!(Some("Other".to_string()), result[97]);
    }

    #[test]
    fn no_rare_values_is_an_identity_transform() {
        let values = vec![Some("a"), Some("a"), Some("b"), Some("b")];
        let result = suppress(values.clone());

        assert_eq!(
            values
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect::<Vec<_>>(),
            result
        );
    }
}
