use anyhow::Result;
use clap::{Arg, Command};
use csvcloak::{
    anonymize, compare, read_csv_path, write_csv, ArtifactRef, ComparisonReport,
    CorrelationMatrix, PrivacyConfig, Renderer, StatsTable,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{subscriber::set_global_default, Level};

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    epsilon: Option<f64>,
    identifier_keywords: Option<Vec<String>>,
    seed: Option<u64>,
}

fn load_config(path: &Path) -> Result<FileConfig, config::ConfigError> {
    let mut s = config::Config::default();
    s.merge(config::File::from(path))?;
    s.try_into()
}

/// Stand-in for the rendering collaborator: dumps each plot's source data as
/// a CSV artifact under the plots directory.
struct CsvArtifactWriter {
    directory: PathBuf,
}

impl Renderer for CsvArtifactWriter {
    fn render_histogram(&self, values: &[f64], label: &str) -> Result<ArtifactRef> {
        let path = self.directory.join(format!("{}.csv", label));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(&["value"])?;
        for value in values {
            writer.write_record(&[value.to_string()])?;
        }
        writer.flush()?;

        Ok(path.to_string_lossy().into_owned())
    }

    fn render_correlation(&self, matrix: &CorrelationMatrix, label: &str) -> Result<ArtifactRef> {
        let path = self.directory.join(format!("{}.csv", label));
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec![String::new()];
        header.extend(matrix.columns.iter().cloned());
        writer.write_record(&header)?;

        for (name, row) in matrix.columns.iter().zip(&matrix.values) {
            let mut record = vec![name.clone()];
            record.extend(row.iter().map(|v| format!("{:.2}", v)));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        Ok(path.to_string_lossy().into_owned())
    }
}

fn main() -> Result<()> {
    let matches = Command::new("csvcloak")
        .version("0.1.0")
        .about("An anonymizing toolkit for tabular datasets")
        .arg(Arg::new("input").required(true).help("Path to the CSV dataset"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("./csvcloak.toml")
                .help("Path to the config file to use"),
        )
        .arg(
            Arg::new("epsilon")
                .short('e')
                .long("epsilon")
                .takes_value(true)
                .help("Privacy parameter; lower means more noise"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .takes_value(true)
                .help("Seed for reproducible noise draws"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .help("Write the anonymized dataset to this CSV file"),
        )
        .arg(
            Arg::new("plots-dir")
                .long("plots-dir")
                .takes_value(true)
                .default_value("./plots")
                .help("Directory for plot artifacts"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .takes_value(true)
                .default_value("INFO")
                .help("Sets the level of verbosity"),
        )
        .get_matches();

    let tracing_level = Level::from_str(
        matches
            .value_of("verbosity")
            .expect("Missing value for 'verbosity' argument"),
    )?;

    let collector = tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .finish();

    set_global_default(collector)?;

    let config_file_path = Path::new(
        matches
            .value_of("config")
            .expect("Missing value for 'config' argument"),
    );

    let file_config = if config_file_path.exists() {
        load_config(config_file_path)?
    } else {
        FileConfig::default()
    };

    let mut config = PrivacyConfig::default();
    if let Some(keywords) = file_config.identifier_keywords {
        config.identifier_keywords = keywords;
    }
    if let Some(epsilon) = file_config.epsilon {
        config.epsilon = epsilon;
    }
    config.seed = file_config.seed;

    if let Some(epsilon) = matches.value_of("epsilon") {
        config.epsilon = epsilon.parse()?;
    }
    if let Some(seed) = matches.value_of("seed") {
        config.seed = Some(seed.parse()?);
    }

    let input = matches
        .value_of("input")
        .expect("Missing value for 'input' argument");
    let dataset = read_csv_path(input)?;

    let plots_dir = PathBuf::from(
        matches
            .value_of("plots-dir")
            .expect("Missing value for 'plots-dir' argument"),
    );
    fs::create_dir_all(&plots_dir)?;

    let renderer = CsvArtifactWriter {
        directory: plots_dir,
    };

    let report = compare(&dataset, &config, &renderer)?;
    print_report(&report);

    if let Some(output) = matches.value_of("output") {
        let result = anonymize(&dataset, &config)?;
        let file = fs::File::create(output)?;
        write_csv(&result.dataset, file)?;
        println!("\nanonymized dataset written to {}", output);
    }

    Ok(())
}

fn print_report(report: &ComparisonReport) {
    if !report.removed_columns.is_empty() {
        println!("dropped columns:     {}", report.removed_columns.join(", "));
    }
    if !report.generalized_columns.is_empty() {
        println!(
            "generalized columns: {}",
            report.generalized_columns.join(", ")
        );
    }

    print_stats("original", &report.original_stats);
    print_stats("anonymized", &report.anonymized_stats);

    if !report.original_plots.is_empty() || !report.anonymized_plots.is_empty() {
        println!("\nplot artifacts:");
        for artifact in report.original_plots.iter().chain(&report.anonymized_plots) {
            println!("  {}", artifact);
        }
    }

    println!("\nanonymized sample:");
    println!("  {}", report.sample_rows.columns.join(", "));
    for row in &report.sample_rows.rows {
        println!("  {}", row.join(", "));
    }
}

fn print_stats(title: &str, table: &StatsTable) {
    println!("\n{} statistics:", title);

    match table {
        StatsTable::Numeric(summaries) => {
            println!(
                "  {:<16} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
            );
            for s in summaries {
                println!(
                    "  {:<16} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                    s.column, s.count, s.mean, s.std_dev, s.min, s.q25, s.median, s.q75, s.max
                );
            }
        }
        StatsTable::Overview(rows) => {
            println!(
                "  {:<16} {:>12} {:>10} {:>10}",
                "column", "kind", "non-null", "null"
            );
            for row in rows {
                println!(
                    "  {:<16} {:>12} {:>10} {:>10}",
                    row.column,
                    row.kind.to_string(),
                    row.non_null,
                    row.nulls
                );
            }
        }
    }
}
