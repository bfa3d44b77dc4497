mod laplace_noise;
mod rank_bucket;
mod suppress_rare;

pub use laplace_noise::LaplaceNoise;
pub use rank_bucket::{RankBucket, RANK_BUCKET_LABELS};
pub use suppress_rare::{SuppressRare, OTHER_CATEGORY};

use arrow::{array::ArrayRef, datatypes::DataType};
use rand::RngCore;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColumnTransformationError {
    #[error("unsupported type: {0}")]
    UnsupportedType(DataType),

    #[error("downcast failed")]
    DowncastFailed,
}

pub type ColumnTransformationResult<T> = Result<T, ColumnTransformationError>;

pub struct ColumnTransformationOutput {
    pub data_type: DataType,
    pub nullable: bool,
}

/// A value-level rewrite of one column. Transformations are stateless across
/// calls; any randomness comes from the generator handed in by the caller,
/// never from ambient global state.
pub trait ColumnTransformation: Send + Sync {
    fn transform_data(
        &self,
        data: ArrayRef,
        rng: &mut dyn RngCore,
    ) -> ColumnTransformationResult<ArrayRef>;

    fn output_format(&self, input: &DataType) -> ColumnTransformationResult<ColumnTransformationOutput>;
}
