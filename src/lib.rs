mod classify;
mod column_transformations;
mod compare;
mod config;
mod csv_io;
mod dataset;
mod error;
mod pipeline;
mod stats;

pub use classify::classify;
pub use column_transformations::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult, LaplaceNoise, RankBucket, SuppressRare, OTHER_CATEGORY,
    RANK_BUCKET_LABELS,
};
pub use compare::{compare, compare_with_rng, ArtifactRef, ComparisonReport, Renderer};
pub use config::{PrivacyConfig, DEFAULT_IDENTIFIER_KEYWORDS};
pub use csv_io::{read_csv, read_csv_path, write_csv};
pub use dataset::{Column, ColumnKind, Dataset, TablePreview};
pub use error::{DatasetLoadError, Error, InvalidConfig};
pub use pipeline::{anonymize, anonymize_with_rng, AnonymizationResult};
pub use stats::{
    basic_stats, correlation_matrix, missing_fraction, numeric_view, ColumnOverview,
    CorrelationMatrix, NumericSummary, StatsTable,
};
