//! `run paper` / `run live` command handlers.

use std::path::PathBuf;

use anyhow::Result;
use qtrade_core::UtcInstant;

use crate::bars;
use crate::factory;
use super::{load_session_config, parse_config_mode};

pub fn paper(config_paths: Vec<String>, bars_path: PathBuf, checkpoint_dir: PathBuf) -> Result<()> {
    let mode = parse_config_mode("PAPER")?;
    let cfg = load_session_config(&config_paths, mode)?;

    let (coordinator, paper_broker) = factory::build_paper_coordinator(&cfg, &checkpoint_dir)?;

    let mut session_bars = bars::read_bars(&bars_path)?;
    session_bars.sort_by_key(|bar| bar.timestamp);

    let start_time = session_bars.first().map(|bar| bar.timestamp).unwrap_or_else(now_fallback);
    coordinator.start(start_time)?;

    for bar in &session_bars {
        coordinator.on_bar(&bar.symbol, bar, bar.timestamp)?;
        for report in paper_broker.process_bar(bar) {
            coordinator.on_fill(&report, bar.timestamp)?;
        }
    }

    let end_time = session_bars.last().map(|bar| bar.timestamp).unwrap_or_else(now_fallback);
    let report = coordinator.stop(end_time)?;
    println!("shutdown_status={:?}", report.status);
    for (symbol, outcome) in &report.per_symbol {
        println!("symbol={symbol} {outcome:?}");
    }
    Ok(())
}

/// `run live` wires an external broker adapter behind [`qtrade_broker::BrokerAdapter`].
/// No concrete venue integration ships in this workspace, so this fails
/// fast rather than silently trading against a stub.
pub fn live(_config_paths: Vec<String>) -> Result<()> {
    anyhow::bail!(
        "live trading requires a concrete BrokerAdapter wired in by the deployer; \
         none is built into this binary"
    )
}

fn now_fallback() -> UtcInstant {
    UtcInstant::from_utc(chrono::Utc::now())
}
