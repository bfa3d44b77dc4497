use super::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult,
};
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array},
    datatypes::DataType,
};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Perturbs a numeric column with zero-centered Laplace noise whose scale is
/// calibrated to the column range: `scale = range * 0.1 / epsilon`. A
/// constant column has range zero and passes through untouched.
pub struct LaplaceNoise {
    pub epsilon: f64,
}

fn sample_laplace(rng: &mut dyn RngCore, scale: f64) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    // Clamp to avoid ln(0) on the unlucky draw.
    let clamped = (1.0 - 2.0 * u.abs()).clamp(f64::EPSILON, 1.0);
    -scale * u.signum() * clamped.ln()
}

/// Decimal places for fractional columns: more precision for small-magnitude
/// data, so the rounding neither leaks the raw noise draw nor flattens it.
fn fractional_decimals(mean: f64) -> i32 {
    let magnitude = if mean == 0.0 { 0.0 } else { mean.abs().log10() };
    (4 - magnitude.floor() as i32).max(2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl ColumnTransformation for LaplaceNoise {
    fn transform_data(
        &self,
        data: ArrayRef,
        rng: &mut dyn RngCore,
    ) -> ColumnTransformationResult<ArrayRef> {
        match data.data_type() {
            DataType::Int64 => {
                let array = data
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or(ColumnTransformationError::DowncastFailed)?;

                let min = array.iter().flatten().min();
                let max = array.iter().flatten().max();
                let range = match (min, max) {
                    (Some(min), Some(max)) => (max - min) as f64,
                    _ => return Ok(data),
                };
                if range == 0.0 {
                    return Ok(data);
                }

                let scale = range * (0.1 / self.epsilon);
                // One draw per row, nulls included, so the noise stream is a
                // function of row count alone.
                let noised: Int64Array = array
                    .iter()
                    .map(|value| {
                        let noise = sample_laplace(rng, scale);
                        value.map(|v| (v as f64 + noise).round() as i64)
                    })
                    .collect();

                Ok(Arc::new(noised))
            }
            DataType::Float64 => {
                let array = data
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or(ColumnTransformationError::DowncastFailed)?;

                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                for value in array.iter().flatten() {
                    min = min.min(value);
                    max = max.max(value);
                }
                if !min.is_finite() || !max.is_finite() || max - min == 0.0 {
                    return Ok(data);
                }

                let scale = (max - min) * (0.1 / self.epsilon);
                let noised: Vec<Option<f64>> = array
                    .iter()
                    .map(|value| {
                        let noise = sample_laplace(rng, scale);
                        value.map(|v| v + noise)
                    })
                    .collect();

                let non_null: Vec<f64> = noised.iter().flatten().copied().collect();
                let mean = non_null.iter().sum::<f64>() / non_null.len() as f64;
                let decimals = fractional_decimals(mean);

                let rounded: Float64Array = noised
                    .into_iter()
                    .map(|value| value.map(|v| round_to(v, decimals)))
                    .collect();

                Ok(Arc::new(rounded))
            }
            other => Err(ColumnTransformationError::UnsupportedType(other.clone())),
        }
    }

    fn output_format(
        &self,
        input: &DataType,
    ) -> ColumnTransformationResult<ColumnTransformationOutput> {
        match input {
            DataType::Int64 | DataType::Float64 => Ok(ColumnTransformationOutput {
                data_type: input.clone(),
                nullable: true,
            }),
            other => Err(ColumnTransformationError::UnsupportedType(other.clone())),
        }
    }
}
