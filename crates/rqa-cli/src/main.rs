use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rqa_core::{
    AnalysisMode, ErrorCode, PhaseSpace, RescaleMode, RqaOutcome, RqaParams, RqaStatistics,
    analyze, analyze_embedded,
};
use rqa_io::{Columns, Delimiter, ReportRow};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "rqa", about = "Recurrence quantification analysis of time series")]
struct Cli {
    /// TOML parameter file (defaults to $RQA_CONFIG when set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    /// Output format on stdout
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Append a summary row to this CSV file
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Write the recurrence matrix as 0/1 text to this file
    #[arg(long, global = true)]
    matrix: Option<PathBuf>,

    /// Cell separator in the input file (default: whitespace or comma)
    #[arg(long, global = true)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

/// Parameter overrides applied on top of the parameter file.
#[derive(Args)]
struct Overrides {
    /// Embedding dimension
    #[arg(long, global = true)]
    dimension: Option<usize>,

    /// Embedding lag in samples
    #[arg(long, global = true)]
    lag: Option<usize>,

    /// Distance normalisation before thresholding
    #[arg(long, global = true, value_enum)]
    rescale: Option<RescaleArg>,

    /// Recurrence radius in rescaled distance units
    #[arg(long, global = true)]
    radius: Option<f64>,

    /// Theiler window half-width (auto mode)
    #[arg(long, global = true)]
    theiler: Option<usize>,

    /// Minimum diagonal/vertical line length
    #[arg(long, global = true)]
    min_line: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Auto-recurrence of one series against itself
    Auto {
        /// Input file of delimited numeric columns
        file: PathBuf,

        /// Zero-based column to analyse
        #[arg(long, default_value_t = 0)]
        column: usize,

        /// Column to analyse, by header name
        #[arg(long, conflicts_with_all = ["column", "embedded"])]
        column_name: Option<String>,

        /// Treat each row as an already-embedded point (all columns)
        #[arg(long, conflicts_with = "column")]
        embedded: bool,
    },

    /// Cross-recurrence between two columns of one file
    Cross {
        /// Input file of delimited numeric columns
        file: PathBuf,

        /// Zero-based columns for the two series
        #[arg(long, num_args = 2, value_names = ["A", "B"], default_values_t = [0, 1])]
        columns: Vec<usize>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Row,
}

#[derive(Clone, Copy, ValueEnum)]
enum RescaleArg {
    None,
    Max,
    Mean,
}

impl From<RescaleArg> for RescaleMode {
    fn from(arg: RescaleArg) -> Self {
        match arg {
            RescaleArg::None => RescaleMode::None,
            RescaleArg::Max => RescaleMode::Max,
            RescaleArg::Mean => RescaleMode::Mean,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    label: &'a str,
    params: &'a RqaParams,
    code: ErrorCode,
    message: &'a str,
    stats: &'a RqaStatistics,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut params = load_params(&cli)?;

    let (file, outcome) = match &cli.command {
        Commands::Auto {
            file,
            column,
            column_name,
            embedded,
        } => {
            params.mode = AnalysisMode::Auto;
            let columns = read_input(&cli, file)?;
            let outcome = if *embedded {
                match PhaseSpace::from_rows(&columns.rows()) {
                    Ok(space) => analyze_embedded(&space, None, &params),
                    Err(err) => degenerate(err),
                }
            } else {
                let x = match column_name {
                    Some(name) => columns.column_named(name)?,
                    None => columns.column(*column)?,
                };
                analyze(x, None, &params)
            };
            (file, outcome)
        }
        Commands::Cross { file, columns: picks } => {
            params.mode = AnalysisMode::Cross;
            let columns = read_input(&cli, file)?;
            let [a, b] = picks[..] else {
                bail!("--columns takes exactly two indices");
            };
            let x = columns.column(a)?;
            let y = columns.column(b)?;
            (file, analyze(x, Some(y), &params))
        }
    };

    if !outcome.is_ok() {
        tracing::warn!(code = %outcome.code, "{}: {}", file.display(), outcome.message);
    }

    let label = file.display().to_string();
    print_outcome(cli.format, &label, &params, &outcome)?;

    if let Some(path) = &cli.report {
        let row = ReportRow::from_outcome(&label, &params, &outcome);
        rqa_io::append_report(path, &row)
            .with_context(|| format!("failed to append report to {}", path.display()))?;
    }
    if let Some(path) = &cli.matrix {
        rqa_io::write_matrix_path(path, &outcome.matrix)
            .with_context(|| format!("failed to write matrix to {}", path.display()))?;
    }

    Ok(())
}

fn load_params(cli: &Cli) -> Result<RqaParams> {
    let mut params = match rqa_io::config_path(cli.config.as_deref()) {
        Some(path) => rqa_io::load_params(&path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => RqaParams::default(),
    };

    let o = &cli.overrides;
    if o.dimension.is_some() || o.lag.is_some() {
        let dimension = o.dimension.unwrap_or(params.embedding.dimension.get());
        let lag = o.lag.unwrap_or(params.embedding.lag.get());
        params.embedding = rqa_core::EmbeddingParams::new(dimension, lag)
            .context("--dimension and --lag must be at least 1")?;
    }
    if let Some(rescale) = o.rescale {
        params.rescale = rescale.into();
    }
    if let Some(radius) = o.radius {
        params.radius = radius;
    }
    if let Some(theiler) = o.theiler {
        params.theiler_window = theiler;
    }
    if let Some(min_line) = o.min_line {
        params.min_line_length = std::num::NonZeroUsize::new(min_line)
            .context("--min-line must be at least 1")?;
    }

    tracing::debug!(?params, "effective parameters");
    Ok(params)
}

fn read_input(cli: &Cli, file: &Path) -> Result<Columns> {
    let delimiter = cli.delimiter.map_or(Delimiter::Auto, Delimiter::Char);
    rqa_io::read_columns_path(file, delimiter)
        .with_context(|| format!("failed to read series from {}", file.display()))
}

fn degenerate(err: rqa_core::RqaError) -> RqaOutcome {
    RqaOutcome {
        matrix: rqa_core::RecurrenceMatrix::empty(),
        stats: RqaStatistics::default(),
        code: err.code(),
        message: err.message().to_string(),
    }
}

fn print_outcome(format: Format, label: &str, params: &RqaParams, outcome: &RqaOutcome) -> Result<()> {
    match format {
        Format::Json => {
            let report = JsonReport {
                label,
                params,
                code: outcome.code,
                message: &outcome.message,
                stats: &outcome.stats,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Row => {
            println!("{}", ReportRow::from_outcome(label, params, outcome).to_csv());
        }
        Format::Text => print_text(label, params, outcome),
    }
    Ok(())
}

fn print_text(label: &str, params: &RqaParams, outcome: &RqaOutcome) {
    let s = &outcome.stats;
    println!("file:             {label}");
    println!(
        "params:           mode={} dim={} lag={} rescale={} radius={} theiler={} minl={}",
        params.mode.as_str(),
        params.embedding.dimension,
        params.embedding.lag,
        params.rescale.as_str(),
        params.radius,
        params.theiler_window,
        params.min_line_length,
    );
    println!("code:             {}", outcome.code);
    if !outcome.is_ok() {
        println!("message:          {}", outcome.message);
        return;
    }
    println!(
        "matrix:           {}x{} ({} of {} eligible recurrent)",
        outcome.matrix.rows(),
        outcome.matrix.cols(),
        s.recurrent_points,
        s.eligible_points
    );
    println!("recurrence_rate:  {:.4}", s.recurrence_rate);
    println!("determinism:      {:.4}", s.determinism);
    println!(
        "diag lines:       count={} max={} mean={:.3} std={:.3}",
        s.count_diag_line, s.max_diag_line, s.mean_diag_line, s.std_diag_line
    );
    println!(
        "entropy:          {:.4} bits (remaining {:.4})",
        s.entropy, s.entropy_remaining
    );
    println!("laminarity:       {:.4}", s.laminarity);
    println!("trapping_time:    {:.3}", s.trapping_time);
    println!("vmax:             {}", s.vmax);
    println!(
        "white vertical:   mean={:.3} max={}",
        s.mean_white_vertical_line, s.max_white_vertical_line
    );
    println!("divergence:       {:.4}", s.divergence);
    println!(
        "trend:            lower={:.6} upper={:.6}",
        s.trend_lower_diag, s.trend_upper_diag
    );
}
