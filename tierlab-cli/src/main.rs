//! TierLab CLI: signal, diagnosis, scan and config commands.
//!
//! Commands:
//! - `signals`: run the tiered state machine on CSV or synthetic data
//! - `diagnose`: latest-bar readout (regime, heat, breadth, advice)
//! - `scan`: breadth snapshot from a directory of per-stock CSVs
//! - `config`: print the resolved TOML config and its hash

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tierlab_core::breadth::{scan_universe, BreadthHistory};
use tierlab_core::data::{
    append_breadth_snapshot, generate_synthetic_breadth, generate_synthetic_index,
    load_breadth_csv, load_price_csv, load_universe_dir, SyntheticSpec,
};
use tierlab_core::diagnosis::{diagnose_latest, Diagnosis};
use tierlab_core::domain::{Bar, Signal};
use tierlab_core::fingerprint::RunManifest;
use tierlab_core::trades::{extract_trades, TradeSummary};
use tierlab_core::{SignalConfig, SignalEngine, SignalSeries};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tierlab",
    about = "TierLab CLI: breadth-driven tiered index signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signal engine and print the per-bar signal table.
    Signals {
        #[command(flatten)]
        input: InputArgs,

        /// Print only the last N bars.
        #[arg(long)]
        tail: Option<usize>,

        /// Print only bars with a buy or sell signal.
        #[arg(long, default_value_t = false)]
        events_only: bool,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the dashboard readout for the latest bar.
    Diagnose {
        #[command(flatten)]
        input: InputArgs,

        /// Emit JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compute a breadth snapshot from a directory of per-stock CSVs.
    Scan {
        /// Directory with one CSV (date, high, close, ...) per constituent.
        dir: PathBuf,

        /// Snapshot date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Merge the snapshot into this breadth CSV (same date is replaced).
        #[arg(long)]
        append: Option<PathBuf>,
    },
    /// Print the resolved configuration as TOML with its hash.
    Config {
        /// TOML config to resolve. Defaults are printed without one.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Index price CSV (date, open, high, low, close, volume, turnover[, amount]).
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Breadth CSV (date, pct_above_ma20 | ma20_ratio, pct_new_high | new_high_ratio).
    #[arg(long)]
    breadth: Option<PathBuf>,

    /// TOML signal config. Defaults apply without one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use seeded synthetic data instead of CSVs.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of synthetic bars.
    #[arg(long, default_value_t = 500)]
    bars: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Signals {
            input,
            tail,
            events_only,
            json,
        } => run_signals_cmd(&input, tail, events_only, json),
        Commands::Diagnose { input, json } => run_diagnose_cmd(&input, json),
        Commands::Scan { dir, date, append } => run_scan_cmd(&dir, date.as_deref(), append),
        Commands::Config { config } => run_config_cmd(config.as_deref()),
    }
}

/// Everything a run needs, loaded from disk or generated.
struct Inputs {
    config: SignalConfig,
    bars: Vec<Bar>,
    breadth: BreadthHistory,
    synthetic: bool,
}

fn load_config(path: Option<&Path>) -> Result<SignalConfig> {
    match path {
        Some(p) => SignalConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(SignalConfig::default()),
    }
}

fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let config = load_config(args.config.as_deref())?;

    if args.synthetic {
        if args.prices.is_some() || args.breadth.is_some() {
            bail!("--synthetic cannot be combined with --prices or --breadth");
        }
        let spec = SyntheticSpec {
            seed: args.seed,
            bars: args.bars,
            ..SyntheticSpec::default()
        };
        let bars = generate_synthetic_index(&spec);
        let breadth = generate_synthetic_breadth(&bars, args.seed);
        return Ok(Inputs {
            config,
            bars,
            breadth,
            synthetic: true,
        });
    }

    let (Some(prices), Some(breadth)) = (&args.prices, &args.breadth) else {
        bail!("--prices and --breadth are required unless --synthetic is set");
    };
    let bars =
        load_price_csv(prices).with_context(|| format!("loading prices {}", prices.display()))?;
    let breadth = load_breadth_csv(breadth)
        .with_context(|| format!("loading breadth {}", breadth.display()))?;

    Ok(Inputs {
        config,
        bars,
        breadth,
        synthetic: false,
    })
}

fn run(inputs: &Inputs) -> Result<(SignalSeries, RunManifest)> {
    let engine = SignalEngine::new(inputs.config.clone())?;
    let manifest = RunManifest::new(&inputs.config, &inputs.bars, &inputs.breadth);
    tracing::info!(
        config_hash = %manifest.config_hash,
        dataset_hash = manifest.dataset_hash.short(),
        bars = manifest.bar_count,
        "running signal engine"
    );
    let series = engine.run(&inputs.bars, &inputs.breadth)?;
    Ok((series, manifest))
}

fn run_signals_cmd(
    input: &InputArgs,
    tail: Option<usize>,
    events_only: bool,
    json: bool,
) -> Result<()> {
    let inputs = load_inputs(input)?;
    let (series, manifest) = run(&inputs)?;
    let trades = extract_trades(&inputs.bars, &series.records);
    let summary = TradeSummary::from_trades(&trades);

    let mut rows: Vec<usize> = (0..series.len())
        .filter(|&i| !events_only || series.records[i].signal != Signal::Hold)
        .collect();
    if let Some(n) = tail {
        rows = rows.split_off(rows.len().saturating_sub(n));
    }

    if json {
        let selected: Vec<_> = rows.iter().map(|&i| &series.records[i]).collect();
        let out = serde_json::json!({
            "manifest": manifest,
            "records": selected,
            "trades": trades,
            "summary": summary,
            "insufficient_history": series.insufficient_history,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{:<10} {:>10} {:>7} {:>7} {:>6} {:>3} {:<9} {:>2} {:<14}",
        "Date", "Close", "Breadth", "HeatZ", "Streak", "Sig", "Tier", "Up", "Exit"
    );
    println!("{}", "-".repeat(80));
    for i in rows {
        let r = &series.records[i];
        let f = &series.features[i];
        let exit = r
            .exit_reason
            .map(|e| format!("{e:?}"))
            .unwrap_or_default();
        println!(
            "{:<10} {:>10.2} {:>7.2} {:>7.2} {:>6} {:>3} {:<9} {:>2} {:<14}",
            r.date,
            inputs.bars[i].close,
            series.breadth[i].pct_above_ma20,
            f.heat_z,
            f.streak,
            r.signal.as_i8(),
            r.tier_label(),
            r.upgrade_flag(),
            exit
        );
    }
    print_summary(&series, &summary, inputs.synthetic);
    Ok(())
}

fn run_diagnose_cmd(input: &InputArgs, json: bool) -> Result<()> {
    let inputs = load_inputs(input)?;
    let (series, _) = run(&inputs)?;
    let Some(diagnosis) = diagnose_latest(&series, &inputs.config) else {
        bail!("no bars to diagnose");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    } else {
        print_diagnosis(&diagnosis, &series);
    }
    Ok(())
}

fn run_scan_cmd(dir: &Path, date: Option<&str>, append: Option<PathBuf>) -> Result<()> {
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{d}'"))?,
        None => chrono::Local::now().date_naive(),
    };

    let universe = load_universe_dir(dir)?;
    let histories: Vec<Vec<Bar>> = universe.into_iter().map(|(_, bars)| bars).collect();
    let Some(outcome) = scan_universe(date, &histories) else {
        bail!("scan found no constituent with enough history in {}", dir.display());
    };

    println!();
    println!("=== Breadth Scan {} ===", outcome.snapshot.date);
    println!("Eligible:        {}", outcome.eligible);
    println!("Skipped:         {}", outcome.skipped);
    println!("Above MA20:      {:.2}%", outcome.snapshot.pct_above_ma20);
    println!("60-day new high: {:.2}%", outcome.snapshot.pct_new_high);

    if let Some(path) = append {
        let history = append_breadth_snapshot(&path, outcome.snapshot)?;
        println!(
            "Saved to {} ({} days of history)",
            path.display(),
            history.len()
        );
    }
    println!();
    Ok(())
}

fn run_config_cmd(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("# config_hash = {}", config.config_hash());
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn print_summary(series: &SignalSeries, summary: &TradeSummary, synthetic: bool) {
    println!();
    println!("=== Signal Run ===");
    if let (Some(first), Some(last)) = (series.records.first(), series.records.last()) {
        println!("Period:         {} to {}", first.date, last.date);
    }
    println!(
        "Bars:           {} ({} warmup)",
        series.len(),
        series.warmup_bars
    );
    println!("Entries:        {}", series.buy_count());
    println!("Closed trades:  {}", summary.closed_trades);
    println!("Winners:        {}", summary.winners);
    println!(
        "Cumulative:     {:.2}%",
        summary.cumulative_return * 100.0
    );
    match series.final_state.open() {
        Some(open) => println!(
            "Position:       long ({}, {} days held{})",
            open.tier,
            open.holding_days,
            summary
                .open_return
                .map(|r| format!(", {:.2}% open", r * 100.0))
                .unwrap_or_default()
        ),
        None => println!("Position:       flat"),
    }
    if series.insufficient_history {
        println!();
        println!("WARNING: series shorter than the longest rolling window");
    }
    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_diagnosis(d: &Diagnosis, series: &SignalSeries) {
    println!();
    println!("=== Diagnosis {} ===", d.date);
    println!("Regime:         {}", d.regime);
    println!("Heat (Z):       {:.2}", d.heat_z);
    println!("Breadth MA20:   {:.1}%", d.pct_above_ma20);
    println!("New highs:      {:.1}%", d.pct_new_high);
    if let Some(date) = d.breadth_date {
        println!("Breadth as of:  {date}");
    }
    let nh = d
        .thresholds
        .new_high_below
        .map(|v| format!(", new highs < {v}%"))
        .unwrap_or_default();
    println!(
        "Sell test:      breadth > {}%, heat < {}{nh}",
        d.thresholds.breadth_above, d.thresholds.heat_below
    );
    println!("Advice:         {}", d.advice);
    if let Some(last) = series.last() {
        println!(
            "Engine:         signal {} / tier {}",
            last.signal.as_i8(),
            last.tier_label()
        );
    }
    println!();
}
