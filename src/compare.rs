use crate::{
    config::PrivacyConfig,
    dataset::{Dataset, TablePreview},
    error::Error,
    pipeline::anonymize_with_rng,
    stats::{basic_stats, correlation_matrix, missing_fraction, numeric_view, CorrelationMatrix, StatsTable},
};
use rand::Rng;
use tracing::warn;
use uuid::Uuid;

/// Opaque reference (path or URI) to an artifact produced by the rendering
/// collaborator.
pub type ArtifactRef = String;

/// External rendering collaborator. Implementations may fail per call;
/// failures are logged and skipped, never fatal to a comparison.
pub trait Renderer: Send + Sync {
    fn render_histogram(&self, values: &[f64], label: &str) -> anyhow::Result<ArtifactRef>;

    fn render_correlation(
        &self,
        matrix: &CorrelationMatrix,
        label: &str,
    ) -> anyhow::Result<ArtifactRef>;
}

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub original_stats: StatsTable,
    pub anonymized_stats: StatsTable,
    pub original_plots: Vec<ArtifactRef>,
    pub anonymized_plots: Vec<ArtifactRef>,
    pub sample_rows: TablePreview,
    pub removed_columns: Vec<String>,
    pub generalized_columns: Vec<String>,
}

const SAMPLE_ROWS: usize = 5;
const MAX_HISTOGRAMS: usize = 3;
const MAX_MISSING_FRACTION: f64 = 0.5;

/// Anonymizes the dataset and reports statistics for both versions, with a
/// generator built from the config seed.
pub fn compare(
    original: &Dataset,
    config: &PrivacyConfig,
    renderer: &dyn Renderer,
) -> Result<ComparisonReport, Error> {
    let mut rng = config.rng();
    compare_with_rng(original, config, &mut rng, renderer)
}

pub fn compare_with_rng<R: Rng>(
    original: &Dataset,
    config: &PrivacyConfig,
    rng: &mut R,
    renderer: &dyn Renderer,
) -> Result<ComparisonReport, Error> {
    let result = anonymize_with_rng(original, config, rng)?;

    Ok(ComparisonReport {
        original_stats: basic_stats(original),
        anonymized_stats: basic_stats(&result.dataset),
        original_plots: request_plots(original, "orig", renderer),
        anonymized_plots: request_plots(&result.dataset, "anon", renderer),
        sample_rows: result.dataset.preview(SAMPLE_ROWS),
        removed_columns: result.removed_columns,
        generalized_columns: result.generalized_columns,
    })
}

/// Collision-free suffix so concurrent comparisons never overwrite each
/// other's artifacts.
fn plot_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(8);
    token
}

fn request_plots(dataset: &Dataset, prefix: &str, renderer: &dyn Renderer) -> Vec<ArtifactRef> {
    let mut plots = Vec::new();

    let views: Vec<(String, Vec<f64>)> = dataset
        .columns()
        .iter()
        .map(|column| (column.name.clone(), numeric_view(column)))
        .collect();

    // Histograms for the first few columns, skipping mostly-missing views.
    for (name, view) in views.iter().take(MAX_HISTOGRAMS) {
        if missing_fraction(view) > MAX_MISSING_FRACTION {
            continue;
        }

        let values: Vec<f64> = view.iter().copied().filter(|v| !v.is_nan()).collect();
        let label = format!("{}_hist_{}_{}", prefix, name, plot_token());

        match renderer.render_histogram(&values, &label) {
            Ok(artifact) => plots.push(artifact),
            Err(err) => warn!("histogram for column '{}' failed: {:#}", name, err),
        }
    }

    let usable: Vec<(String, Vec<f64>)> = views
        .into_iter()
        .filter(|(_, view)| missing_fraction(view) <= MAX_MISSING_FRACTION)
        .collect();

    if let Some(matrix) = correlation_matrix(&usable) {
        let label = format!("{}_corr_{}", prefix, plot_token());
        match renderer.render_correlation(&matrix, &label) {
            Ok(artifact) => plots.push(artifact),
            Err(err) => warn!("correlation heatmap failed: {:#}", err),
        }
    }

    plots
}
