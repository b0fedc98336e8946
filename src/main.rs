use anyhow::{Context, Result};
use biblink::blocking::BlockingStrategy;
use biblink::clustering::Clustering;
use biblink::evaluation::{compare_match_files, evaluate_methods, format_metric, ConfusionCounts};
use biblink::harness::{run_scalability, HarnessOptions, DEFAULT_CHANGES, DEFAULT_VARIANTS_PER_FILE};
use biblink::persist::{
    create_file, write_clusters, write_membership, write_method_results,
    write_scalability_results, CsvMatchSink,
};
use biblink::record::load_dataset_pair;
use biblink::similarity::SimilarityMethod;
use biblink::{run_pipeline, ExecutionMode, PipelineOutcome, ResolutionConfig};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[clap(name = "biblink", about = "Resolve duplicate citations across two bibliographic datasets")]
struct Cli {
    /// Also write daily-rolling logs to this directory
    #[clap(long, global = true)]
    log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

/// Flags shared by every command that runs the pipeline. They override the
/// configuration file and the environment.
#[derive(Args)]
struct RunArgs {
    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Blocking strategy (CrossProduct, FirstLetterTitle, FirstOrLastLetterTitle, Year)
    #[clap(short, long)]
    blocking: Option<BlockingStrategy>,

    /// Similarity method (Jaccard, TitleJaccard, JaroWinkler)
    #[clap(short, long)]
    matching: Option<SimilarityMethod>,

    /// Acceptance threshold in [0, 1]; a pair must score strictly above it
    #[clap(short, long)]
    threshold: Option<f64>,

    /// Run partitioned with this many workers
    #[clap(short, long)]
    workers: Option<usize>,
}

impl RunArgs {
    fn load_config(&self) -> Result<ResolutionConfig> {
        let mut config = ResolutionConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(blocking) = self.blocking {
            config.blocking_method = blocking;
        }
        if let Some(matching) = self.matching {
            config.matching_method = matching;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.execution = ExecutionMode::Partitioned { workers };
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Block, match and cluster two datasets
    Resolve {
        /// Dataset A (ids 0..|A|)
        #[clap(required = true)]
        dataset_a: PathBuf,

        /// Dataset B (ids follow A)
        #[clap(required = true)]
        dataset_b: PathBuf,

        #[clap(flatten)]
        run: RunArgs,

        /// Also score the cross-product baseline and report precision/recall
        #[clap(long)]
        baseline: bool,

        /// Skip clustering
        #[clap(long)]
        no_cluster: bool,

        /// Directory for matches.csv, clusters.csv and membership.csv
        #[clap(short, long, default_value = "results")]
        out_dir: PathBuf,
    },

    /// Score every blocking strategy and similarity method against the baseline
    Evaluate {
        #[clap(required = true)]
        dataset_a: PathBuf,

        #[clap(required = true)]
        dataset_b: PathBuf,

        #[clap(flatten)]
        run: RunArgs,

        /// Thresholds to sweep (comma separated)
        #[clap(long, value_delimiter = ',')]
        thresholds: Vec<f64>,

        /// Output table
        #[clap(short, long, default_value = "results/method_results.csv")]
        output: PathBuf,
    },

    /// Time the pipeline on perturbed variants of the given datasets
    Scale {
        /// Source datasets; variants are paired across the two halves
        #[clap(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        #[clap(flatten)]
        run: RunArgs,

        /// Variants generated per file
        #[clap(long, default_value_t = DEFAULT_VARIANTS_PER_FILE)]
        variants: usize,

        /// Characters substituted per field (year shift is half of this)
        #[clap(long, default_value_t = DEFAULT_CHANGES)]
        changes: usize,

        /// Seed for the perturbations
        #[clap(long, default_value_t = 0)]
        seed: u64,

        /// Also run every pair locally when --workers is given
        #[clap(long)]
        with_local: bool,

        /// Directory for the variant files
        #[clap(long, default_value = "data/variants")]
        variant_dir: PathBuf,

        /// Output table
        #[clap(short, long, default_value = "results/scalability_results.csv")]
        output: PathBuf,
    },

    /// Compare two persisted match tables
    Compare {
        #[clap(required = true)]
        left: PathBuf,

        #[clap(required = true)]
        right: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    biblink::logging::configure_logging(args.log_dir.as_deref());

    match args.command {
        Commands::Resolve {
            dataset_a,
            dataset_b,
            run,
            baseline,
            no_cluster,
            out_dir,
        } => {
            let mut config = run.load_config()?;
            config.baseline |= baseline;
            config.cluster &= !no_cluster;
            resolve(&dataset_a, &dataset_b, &config, &out_dir)?;
        }
        Commands::Evaluate {
            dataset_a,
            dataset_b,
            run,
            thresholds,
            output,
        } => {
            let mut config = run.load_config()?;
            if !thresholds.is_empty() {
                config.sweep_thresholds = thresholds;
                config.validate()?;
            }
            evaluate(&dataset_a, &dataset_b, &config, &output)?;
        }
        Commands::Scale {
            files,
            run,
            variants,
            changes,
            seed,
            with_local,
            variant_dir,
            output,
        } => {
            let config = run.load_config()?;
            let mut options = HarnessOptions::new(variant_dir);
            options.variants_per_file = variants;
            options.changes = changes;
            options.seed = seed;
            options.modes = match config.execution {
                ExecutionMode::Local => vec![ExecutionMode::Local],
                partitioned if with_local => vec![ExecutionMode::Local, partitioned],
                partitioned => vec![partitioned],
            };
            scale(&files, &options, &config, &output)?;
        }
        Commands::Compare { left, right } => {
            let counts = compare_match_files(&left, &right).with_context(|| {
                format!("Failed to compare {} and {}", left.display(), right.display())
            })?;
            print_comparison(&left, &right, &counts);
        }
    }

    Ok(())
}

fn resolve(path_a: &Path, path_b: &Path, config: &ResolutionConfig, out_dir: &Path) -> Result<()> {
    let (a, b) = load_dataset_pair(path_a, path_b, &config.columns)
        .context("Failed to load datasets")?;

    let matches_path = out_dir.join("matches.csv");
    let mut sink = CsvMatchSink::create(&matches_path)
        .with_context(|| format!("Failed to create {}", matches_path.display()))?;
    let outcome = run_pipeline(&a, &b, config, &mut sink)?;
    info!("Wrote {} matches to {}", sink.rows(), matches_path.display());

    if let Some(clustering) = &outcome.clustering {
        write_cluster_tables(clustering, out_dir)?;
    }

    print_outcome(&outcome);
    Ok(())
}

fn write_cluster_tables(clustering: &Clustering, out_dir: &Path) -> Result<()> {
    let clusters_path = out_dir.join("clusters.csv");
    write_clusters(create_file(&clusters_path)?, clustering)
        .with_context(|| format!("Failed to write {}", clusters_path.display()))?;

    let membership_path = out_dir.join("membership.csv");
    write_membership(create_file(&membership_path)?, clustering)
        .with_context(|| format!("Failed to write {}", membership_path.display()))?;
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    println!("{}", "Resolution summary".bold());

    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Mode"), Cell::new(&outcome.mode.to_string())]));
    table.add_row(Row::new(vec![Cell::new("Records"), Cell::new(&outcome.records.to_string())]));
    table.add_row(Row::new(vec![
        Cell::new("Candidates"),
        Cell::new(&outcome.stats.candidates.to_string()),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Matches"),
        Cell::new(&outcome.matches.len().to_string()),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Match rate"),
        Cell::new(&format!("{:.4}", outcome.match_rate())),
    ]));
    if let Some(clustering) = &outcome.clustering {
        table.add_row(Row::new(vec![
            Cell::new("Clusters"),
            Cell::new(&clustering.len().to_string()),
        ]));
    }
    if let Some(counts) = &outcome.baseline {
        table.add_row(Row::new(vec![
            Cell::new("Precision"),
            Cell::new(&format_metric(counts.precision())),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Recall"),
            Cell::new(&format_metric(counts.recall())),
        ]));
        table.add_row(Row::new(vec![Cell::new("F1"), Cell::new(&format_metric(counts.f1()))]));
    }
    table.add_row(Row::new(vec![
        Cell::new("Blocking+matching"),
        Cell::new(&format!("{:.3}s", outcome.timings.blocking_matching.as_secs_f64())),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Total"),
        Cell::new(&format!("{:.3}s", outcome.timings.total.as_secs_f64())),
    ]));
    table.printstd();
}

fn evaluate(path_a: &Path, path_b: &Path, config: &ResolutionConfig, output: &Path) -> Result<()> {
    let (a, b) = load_dataset_pair(path_a, path_b, &config.columns)
        .context("Failed to load datasets")?;

    let results = evaluate_methods(
        &a,
        &b,
        &config.sweep_thresholds,
        &SimilarityMethod::ALL,
        &BlockingStrategy::ALL,
    )?;
    write_method_results(create_file(output)?, &results)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Threshold"),
        Cell::new("Matching"),
        Cell::new("Blocking"),
        Cell::new("Candidates"),
        Cell::new("Matches"),
        Cell::new("Precision"),
        Cell::new("Recall"),
        Cell::new("F1"),
        Cell::new("Time"),
    ]));
    for result in &results {
        table.add_row(Row::new(vec![
            Cell::new(&result.threshold.to_string()),
            Cell::new(result.matching_method.name()),
            Cell::new(result.blocking_method.name()),
            Cell::new(&result.candidates.to_string()),
            Cell::new(&result.matches.to_string()),
            Cell::new(&format_metric(result.counts.precision())),
            Cell::new(&format_metric(result.counts.recall())),
            Cell::new(&format_metric(result.counts.f1())),
            Cell::new(&format!("{:.3}s", result.duration.as_secs_f64())),
        ]));
    }
    table.printstd();
    println!("Method results written to {}", output.display().to_string().as_str().green());
    Ok(())
}

fn scale(
    files: &[PathBuf],
    options: &HarnessOptions,
    config: &ResolutionConfig,
    output: &Path,
) -> Result<()> {
    let rows = run_scalability(files, options, config)?;
    write_scalability_results(create_file(output)?, &rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Pair"),
        Cell::new("Mode"),
        Cell::new("Rate"),
        Cell::new("Blocking+matching"),
        Cell::new("Total"),
    ]));
    for row in &rows {
        table.add_row(Row::new(vec![
            Cell::new(&row.pair),
            Cell::new(&row.mode),
            Cell::new(&format!("{:.4}", row.match_rate)),
            Cell::new(&format!("{:.3}s", row.blocking_matching_secs)),
            Cell::new(&format!("{:.3}s", row.total_secs)),
        ]));
    }
    table.printstd();
    println!("Scalability results written to {}", output.display().to_string().as_str().green());
    Ok(())
}

fn print_comparison(left: &Path, right: &Path, counts: &ConfusionCounts) {
    let differences = counts.false_negative + counts.false_positive;
    let status = if differences == 0 {
        "identical".green()
    } else {
        format!("{} differences", differences).as_str().red()
    };
    println!("{}: {}", "Comparison".bright_blue(), status);

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new(&left.display().to_string()),
        Cell::new(&counts.baseline_len().to_string()),
    ]));
    table.add_row(Row::new(vec![
        Cell::new(&right.display().to_string()),
        Cell::new(&counts.candidate_len().to_string()),
    ]));
    for (label, count) in [
        ("Shared", counts.true_positive),
        ("Only left", counts.false_negative),
        ("Only right", counts.false_positive),
    ] {
        table.add_row(Row::new(vec![Cell::new(label), Cell::new(&count.to_string())]));
    }
    table.printstd();
}
