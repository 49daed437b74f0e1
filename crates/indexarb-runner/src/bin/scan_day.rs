//! Scan one trading day for strike-pair opportunities.
//!
//! ```bash
//! cargo run --bin scan_day -- --data-dir data --pair SPY/SPX --right C --rank safety
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use indexarb_data::{load_option_quotes, load_option_trades, load_underlying};
use indexarb_engine::export::et_minute_label;
use indexarb_engine::scanner::{scan_parallel, ScanInputs};
use indexarb_models::config::DEFAULT_MIN_VOLUME;
use indexarb_models::{
    RankBy, Right, SpreadDirection, StrategyConfig, StrategyKind,
};
use indexarb_runner::{init_tracing, parse_pair, resolve_date, scan_workers};

#[derive(Debug, Parser)]
#[command(about = "Scan a trading day's strike pairs for hedged credit entries")]
struct Args {
    /// Directory holding the per-date CSV files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Trading date (yyyymmdd). Defaults to the most recent with data.
    #[arg(long)]
    date: Option<String>,

    /// Symbol pair, sym1/sym2.
    #[arg(long, default_value = "SPY/SPX")]
    pair: String,

    /// Option right to scan: C or P.
    #[arg(long, default_value = "C")]
    right: String,

    /// Minimum total daily volume per contract.
    #[arg(long, default_value_t = DEFAULT_MIN_VOLUME)]
    min_volume: u64,

    /// Report thin pairs instead of hiding them.
    #[arg(long)]
    show_illiquid: bool,

    /// Ranking: safety, profit, or risk-reward.
    #[arg(long, default_value = "safety")]
    rank: String,

    /// Scan worker threads (0 = auto).
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Write the full result set as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Rows to print.
    #[arg(long, default_value_t = 15)]
    top: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let (sym1, sym2) = parse_pair(&args.pair)?;
    let right = Right::from_str(&args.right)?;
    let rank = RankBy::from_str(&args.rank)?;
    let date = resolve_date(&args.data_dir, args.date.as_deref())?;

    let config = StrategyConfig::for_pair(
        &sym1,
        &sym2,
        match right {
            Right::Call => StrategyKind::CallsOnly,
            Right::Put => StrategyKind::PutsOnly,
        },
        SpreadDirection::SellSym2BuySym1,
        SpreadDirection::SellSym1BuySym2,
    )?;

    info!(%date, pair = %args.pair, right = %right, "loading market data");
    let underlying = load_underlying(&args.data_dir, &date)?;
    let trades = load_option_trades(&args.data_dir, &date)?;
    let quotes = load_option_quotes(&args.data_dir, &date)?;
    let (sym1_frame, sym2_frame) = underlying.symbol_frames(&sym1, &sym2);

    let mut inputs = ScanInputs::new(
        trades.as_ref(),
        quotes.as_ref(),
        &sym1_frame,
        &sym2_frame,
        right,
        &config,
    );
    inputs.min_volume = args.min_volume;
    inputs.hide_illiquid = !args.show_illiquid;

    let cancel = AtomicBool::new(false);
    let outcome = scan_parallel(&inputs, &cancel, scan_workers(args.workers))?;
    info!(
        results = outcome.results.len(),
        skipped = outcome.skipped,
        "scan complete"
    );

    if let Some(path) = &args.json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &outcome)?;
        info!(path = %path.display(), "wrote scan results");
    }

    println!(
        "{:>8} {:>9} {:>8} {:>7} {:>10} {:>12} {:>7} {:>10} {:>5}",
        "sym1_k", "sym2_k", "spread", "at", "credit", "worst_pnl", "entry", "direction", "liq"
    );
    for result in outcome.ranked(rank).iter().take(args.top) {
        println!(
            "{:>8.1} {:>9.1} {:>8.3} {:>7} {:>10.2} {:>12.2} {:>7} {:>10} {:>5}",
            result.sym1_strike,
            result.sym2_strike,
            result.max_spread,
            et_minute_label(result.max_spread_time),
            result.credit_at_max,
            result.best_worst_pnl,
            et_minute_label(result.best_worst_time),
            match result.direction {
                indexarb_models::ScanDirection::SellSym2 => format!("sell {sym2}"),
                indexarb_models::ScanDirection::SellSym1 => format!("sell {sym1}"),
            },
            if result.liquidity_ok { "OK" } else { "LOW" },
        );
    }

    Ok(())
}
