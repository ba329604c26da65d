//! Sheet Compare
//!
//! Command line front end: compare two workbooks cell by cell and export the
//! annotated result as a side-by-side view, print document, CSV or JSON.

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sheet_compare::prelude::*;

#[derive(Parser)]
#[command(name = "sheet-compare")]
#[command(about = "Cell-by-cell fuzzy comparison of spreadsheet tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for comparison results
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Side-by-side HTML view with highlighted cells
    Html,
    /// Print-oriented HTML (A4 landscape) for PDF conversion
    Print,
    /// Semicolon-separated CSV of differing cells only
    Csv,
    /// Full annotated result as JSON
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html | OutputFormat::Print => "html",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two workbooks
    ///
    /// Parameters default to ComparisonParams::default() (80%, characters),
    /// then --config, then explicit flags.
    Compare {
        /// Workbook A (left side)
        #[arg(long)]
        file_a: PathBuf,

        /// Workbook B (right side)
        #[arg(long)]
        file_b: PathBuf,

        /// Sheet to read from A [default: first sheet]
        #[arg(long)]
        sheet_a: Option<String>,

        /// Sheet to read from B [default: first sheet]
        #[arg(long)]
        sheet_b: Option<String>,

        /// Output file path
        #[arg(long)]
        output: PathBuf,

        /// Output format: html, print, csv or json
        #[arg(long, value_enum, default_value = "html")]
        format: OutputFormat,

        /// Also write the differing-cells CSV (derived from output path)
        #[arg(long)]
        csv: bool,

        /// Minimum similarity percent, clamped to 0..=100 [default: 80]
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,

        /// Metric: characters or levenshtein [default: characters]
        #[arg(long)]
        metric: Option<String>,

        /// JSON file with threshold/metric
        #[arg(long)]
        config: Option<PathBuf>,

        /// Suppress summary and log output
        #[arg(long)]
        quiet: bool,

        /// Print first N differing cells to console
        #[arg(long)]
        show_diffs: Option<usize>,
    },

    /// Score two strings with a metric
    Similarity {
        a: String,
        b: String,

        /// Metric: characters or levenshtein [default: characters]
        #[arg(long)]
        metric: Option<String>,
    },

    /// Compare many workbook pairs listed in a JSON manifest, in parallel
    Batch {
        /// JSON array of {"name"?, "file_a", "file_b", "sheet_a"?, "sheet_b"?}
        #[arg(long)]
        manifest: PathBuf,

        /// Directory receiving one output file per pair
        #[arg(long)]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,

        #[arg(long)]
        metric: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        quiet: bool,
    },

    /// Benchmark diff marking performance
    Benchmark {
        /// Number of iterations per metric
        #[arg(long, default_value = "20")]
        iterations: usize,

        /// Data rows per table
        #[arg(long, default_value = "1000")]
        rows: usize,

        /// Columns per table
        #[arg(long, default_value = "12")]
        cols: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let quiet = match &cli.command {
        Commands::Compare { quiet, .. } | Commands::Batch { quiet, .. } => *quiet,
        _ => false,
    };
    init_tracing(quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber (stderr, RUST_LOG overrides).
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "sheet_compare=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Compare {
            file_a,
            file_b,
            sheet_a,
            sheet_b,
            output,
            format,
            csv,
            threshold,
            metric,
            config,
            quiet,
            show_diffs,
        } => {
            let params = resolve_params(config.as_deref(), threshold, metric.as_deref())?;

            let result = compare_files(
                &file_a,
                &file_b,
                sheet_a.as_deref(),
                sheet_b.as_deref(),
                &params,
            )?;

            write_output(&result, format, &output)?;

            // Also output CSV if requested (and not already CSV format)
            if csv && !matches!(format, OutputFormat::Csv) {
                let csv_path = output.with_extension("csv");
                write_diff_csv_file(&diff_records(&result), &csv_path)?;
                if !quiet {
                    eprintln!("CSV output: {}", csv_path.display());
                }
            }

            if !quiet {
                print_summary(&result);
                eprintln!("\nOutput: {}", output.display());
            }

            if let Some(limit) = show_diffs {
                println!("\n=== Differing Cells ===");
                print_diffs(&diff_records(&result), Some(limit));
            }
        }

        Commands::Similarity { a, b, metric } => {
            let metric = resolve_metric(metric.as_deref(), Metric::default());
            println!("{:.2}", similarity(&a, &b, metric));
        }

        Commands::Batch {
            manifest,
            output_dir,
            format,
            threshold,
            metric,
            config,
            quiet,
        } => {
            let params = resolve_params(config.as_deref(), threshold, metric.as_deref())?;
            let file = std::fs::File::open(&manifest)?;
            let pairs: Vec<BatchPair> = serde_json::from_reader(std::io::BufReader::new(file))?;

            std::fs::create_dir_all(&output_dir)?;

            let outcomes = compare_batch(&pairs, &params, !quiet);
            let mut failed = 0usize;

            // A failed comparison or write is reported for its pair only
            for (index, outcome) in outcomes.iter().enumerate() {
                let written = outcome
                    .result
                    .as_ref()
                    .map_err(|e| e.to_string())
                    .and_then(|result| {
                        let name = batch_file_name(index, &outcome.name, format.extension());
                        let path = output_dir.join(name);
                        write_output(result, format, &path)
                            .map(|()| (result, path))
                            .map_err(|e| e.to_string())
                    });

                match written {
                    Ok((result, path)) => println!(
                        "OK     {}: {} differing cells -> {}",
                        outcome.name,
                        result.summary.differing_positions,
                        path.display()
                    ),
                    Err(reason) => {
                        failed += 1;
                        println!("FAILED {}: {}", outcome.name, reason);
                    }
                }
            }

            if failed > 0 {
                return Err(format!("{} of {} comparisons failed", failed, outcomes.len()).into());
            }
        }

        Commands::Benchmark {
            iterations,
            rows,
            cols,
        } => {
            run_benchmark(iterations, rows, cols);
        }
    }

    Ok(())
}

/// Defaults, then config file, then explicit flags.
fn resolve_params(
    config: Option<&Path>,
    threshold: Option<i64>,
    metric: Option<&str>,
) -> Result<ComparisonParams, ConfigError> {
    let mut params = match config {
        Some(path) => load_params(path)?,
        None => ComparisonParams::default(),
    };

    if let Some(threshold) = threshold {
        params = params.with_threshold(threshold);
    }
    params.metric = resolve_metric(metric, params.metric);

    Ok(params)
}

/// Unknown selectors fall back to character overlap, with a warning.
fn resolve_metric(selector: Option<&str>, current: Metric) -> Metric {
    match selector {
        None => current,
        Some(s) => Metric::parse_selector(s).unwrap_or_else(|| {
            warn!(selector = s, "unknown metric, using characters");
            Metric::CharacterOverlap
        }),
    }
}

fn write_output(
    result: &ComparisonResult,
    format: OutputFormat,
    path: &Path,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Html => write_side_by_side_html_file(result, path),
        OutputFormat::Print => write_print_html_file(result, path),
        OutputFormat::Csv => write_diff_csv_file(&diff_records(result), path),
        OutputFormat::Json => write_json_file(result, path),
    }
}

/// Run marking benchmark on synthetic tables.
fn run_benchmark(iterations: usize, rows: usize, cols: usize) {
    use std::time::Instant;

    println!("=== Diff Marking Benchmark ===");
    println!("Iterations: {}", iterations);
    println!("Table size: {} rows x {} columns", rows, cols);

    let header: Vec<String> = (0..cols).map(|c| format!("Coluna {}", c + 1)).collect();
    let build = |variant: bool| -> Table {
        let mut data = vec![header.clone()];
        for r in 0..rows {
            data.push(
                (0..cols)
                    .map(|c| {
                        if variant && (r * cols + c) % 7 == 0 {
                            format!("Condomínio {} unidade {}", r + 3, c)
                        } else {
                            format!("Condomínio {} unidade {}", r, c)
                        }
                    })
                    .collect(),
            );
        }
        Table::from_rows(data)
    };
    let table_a = build(false);
    let table_b = build(true);

    for metric in [Metric::CharacterOverlap, Metric::EditDistance] {
        println!("\nMetric: {}", metric);
        let start = Instant::now();
        let mut cells = 0usize;
        for _ in 0..iterations {
            let (annotated_a, _) = mark(&table_a, &table_b, 80, metric);
            cells = summarize(&annotated_a).cells_different;
        }
        let elapsed = start.elapsed();
        let per_run = elapsed.as_secs_f64() / iterations.max(1) as f64;
        let cells_per_sec = (rows * cols) as f64 / per_run;
        println!("  Total time: {:.3}s", elapsed.as_secs_f64());
        println!("  Per comparison: {:.3}ms", per_run * 1000.0);
        println!("  Cell pairs/sec: {:.0}", cells_per_sec);
        println!("  Cells marked: {}", cells);
    }
}
