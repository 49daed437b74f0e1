//! Analyze one candidate position end to end: price the legs at an entry
//! minute, build the position (stale gate included), run the stress grid,
//! settle at the day's close, and emit the JSON snapshot.
//!
//! ```bash
//! cargo run --bin analyze_day -- --date 20260213 --sym1-strike 600 --sym2-strike 6000 \
//!     --entry 15:02 --strategy calls_only --json out.json
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use tracing::info;

use indexarb_data::{load_option_quotes, load_option_trades, load_underlying, TradingDate};
use indexarb_engine::export::analysis_snapshot;
use indexarb_engine::pnl::best_worst_case;
use indexarb_engine::position::{build, EntryUnderlying, LegPrices};
use indexarb_engine::pricing::PriceLookup;
use indexarb_engine::settlement::eod_settlement;
use indexarb_models::{Right, SpreadDirection, StrategyConfig, StrategyKind};
use indexarb_runner::{init_tracing, parse_pair, resolve_date};

#[derive(Debug, Parser)]
#[command(about = "Price, stress, and settle one hedged position from recorded data")]
struct Args {
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Trading date (yyyymmdd). Defaults to the most recent with data.
    #[arg(long)]
    date: Option<String>,

    #[arg(long, default_value = "SPY/SPX")]
    pair: String,

    #[arg(long)]
    sym1_strike: f64,

    #[arg(long)]
    sym2_strike: f64,

    /// Entry minute in UTC, HH:MM.
    #[arg(long)]
    entry: String,

    /// full, calls_only, or puts_only.
    #[arg(long, default_value = "calls_only")]
    strategy: String,

    /// sell_sym2_buy_sym1 or sell_sym1_buy_sym2.
    #[arg(long, default_value = "sell_sym2_buy_sym1")]
    call_direction: String,

    #[arg(long, default_value = "sell_sym1_buy_sym2")]
    put_direction: String,

    /// Write the snapshot to this path instead of stdout.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let (sym1, sym2) = parse_pair(&args.pair)?;
    let date = resolve_date(&args.data_dir, args.date.as_deref())?;
    let entry_time = entry_timestamp(&date, &args.entry)?;

    let config = StrategyConfig::for_pair(
        &sym1,
        &sym2,
        StrategyKind::from_str(&args.strategy)?,
        SpreadDirection::from_str(&args.call_direction)?,
        SpreadDirection::from_str(&args.put_direction)?,
    )?;

    info!(%date, entry = %args.entry, "loading market data");
    let underlying = load_underlying(&args.data_dir, &date)?;
    let trades = load_option_trades(&args.data_dir, &date)?;
    let quotes = load_option_quotes(&args.data_dir, &date)?;
    let (sym1_frame, sym2_frame) = underlying.symbol_frames(&sym1, &sym2);

    let entry_sym1 = sym1_frame
        .at_or_before(entry_time)
        .with_context(|| format!("no {sym1} bar at or before {entry_time}"))?
        .close;
    let entry_sym2 = sym2_frame
        .at_or_before(entry_time)
        .with_context(|| format!("no {sym2} bar at or before {entry_time}"))?
        .close;

    let lookup = PriceLookup::new(trades.as_ref(), quotes.as_ref());
    let prices = LegPrices {
        sym1_call: lookup.price_at(&sym1, args.sym1_strike, Right::Call, entry_time),
        sym2_call: lookup.price_at(&sym2, args.sym2_strike, Right::Call, entry_time),
        sym1_put: lookup.price_at(&sym1, args.sym1_strike, Right::Put, entry_time),
        sym2_put: lookup.price_at(&sym2, args.sym2_strike, Right::Put, entry_time),
    };

    let entry = EntryUnderlying {
        sym1: entry_sym1,
        sym2: entry_sym2,
    };
    let position = build(&config, args.sym1_strike, args.sym2_strike, &prices, entry)?;
    for warning in &position.warnings {
        tracing::warn!("{warning}");
    }

    let grid = best_worst_case(&config, &position, entry_sym1, entry_sym2)?;

    let terminal_sym1 = sym1_frame
        .last()
        .with_context(|| format!("no {sym1} bars for the day"))?
        .close;
    let terminal_sym2 = sym2_frame
        .last()
        .with_context(|| format!("no {sym2} bars for the day"))?
        .close;
    let eod = eod_settlement(&config, &position, terminal_sym1, terminal_sym2)?;

    let snapshot = analysis_snapshot(
        date.dashed(),
        entry_time,
        &config,
        args.sym1_strike,
        args.sym2_strike,
        &position,
        &prices,
        entry,
        &grid,
        &eod,
    );

    match &args.json {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            serde_json::to_writer_pretty(file, &snapshot)?;
            info!(path = %path.display(), "wrote analysis snapshot");
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }

    Ok(())
}

fn entry_timestamp(date: &TradingDate, entry: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date.raw(), "%Y%m%d")
        .with_context(|| format!("bad trading date {}", date.raw()))?;
    let Ok(time) = NaiveTime::parse_from_str(entry, "%H:%M") else {
        bail!("entry must be HH:MM (UTC), got {entry:?}");
    };
    Ok(day.and_time(time).and_utc())
}
