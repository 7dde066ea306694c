//! Builds a [`CoordinatorDeps`] (and the [`qtrade_runtime::Coordinator`] it
//! feeds) from a loaded [`SessionConfig`]. Wiring lives here rather than in
//! `qtrade-runtime` itself so the coordinator stays ignorant of how its
//! facades get constructed.

use std::sync::Arc;

use anyhow::{Context, Result};
use qtrade_agent::FsdAgent;
use qtrade_aggregator::Aggregator;
use qtrade_broker::{BrokerAdapter, PaperBroker};
use qtrade_checkpoint::CheckpointManager;
use qtrade_config::SessionConfig;
use qtrade_idempotency::IdempotencyTracker;
use qtrade_lifecycle::{EodFlattenSchedule, SessionCalendar, StopController};
use qtrade_portfolio::Portfolio;
use qtrade_risk::RiskEngine;
use qtrade_runtime::{Coordinator, CoordinatorDeps};

/// Naive always-17:00-UTC close calendar. Stand-in until a real market
/// calendar (holidays, early closes) is wired from an external source.
struct FixedUtcCloseCalendar {
    close_hour: u32,
}

impl SessionCalendar for FixedUtcCloseCalendar {
    fn close_time(&self, date: chrono::NaiveDate) -> qtrade_core::UtcInstant {
        use chrono::TimeZone;
        let naive = date.and_hms_opt(self.close_hour, 0, 0).expect("valid close hour");
        qtrade_core::UtcInstant::from_utc(chrono::Utc.from_utc_datetime(&naive))
    }
}

/// Builds every paper-mode facade and hands back a ready-to-`start`
/// [`Coordinator`] alongside the concrete [`PaperBroker`] driving it — the
/// caller needs the latter directly to feed bars into `process_bar`, since
/// `CoordinatorDeps` only takes the broker as a `dyn BrokerAdapter`. The
/// checkpoint directory, idempotency TTL, and broker fill rules all come
/// from `cfg`; a missing `broker` section falls back to
/// [`qtrade_broker::FillRulesConfig::default`] with zero commission.
pub fn build_paper_coordinator(
    cfg: &SessionConfig,
    checkpoint_dir: &std::path::Path,
) -> Result<(Arc<Coordinator>, Arc<PaperBroker>)> {
    let portfolio = Arc::new(Portfolio::new(cfg.session.initial_cash));
    let risk = Arc::new(RiskEngine::new(cfg.risk.clone(), cfg.session.initial_cash));
    let aggregator = Arc::new(Aggregator::new(cfg.aggregator.timeframes.clone(), cfg.aggregator.max_retention));
    let agent = Arc::new(FsdAgent::new(cfg.agent.clone()));
    let idempotency = Arc::new(IdempotencyTracker::with_persistence(
        cfg.idempotency.ttl_seconds,
        checkpoint_dir.join("idempotency.json"),
    )?);

    let (fill_rules, commission_per_fill) = match &cfg.broker {
        Some(section) => (section.fill_rules.clone(), section.commission_per_fill),
        None => (Default::default(), qtrade_core::Micros::ZERO),
    };
    let paper_broker = Arc::new(PaperBroker::new(fill_rules, commission_per_fill));
    let broker: Arc<dyn BrokerAdapter> = paper_broker.clone();

    let checkpoint = CheckpointManager::new(checkpoint_dir, 64)
        .with_context(|| format!("create checkpoint dir {}", checkpoint_dir.display()))?;

    let stop_controller = Arc::new(StopController::new());

    let eod = cfg.lifecycle.as_ref().map(|lifecycle| {
        let schedule = Arc::new(EodFlattenSchedule::new(lifecycle.eod_minutes_before_close));
        let calendar: Arc<dyn SessionCalendar> = Arc::new(FixedUtcCloseCalendar { close_hour: 21 });
        (schedule, calendar)
    });

    let deps = CoordinatorDeps {
        portfolio,
        risk,
        aggregator,
        agent,
        idempotency,
        broker,
        checkpoint,
        capital_mode: cfg.capital.clone(),
        stop_controller,
        eod,
        pattern_cfg: cfg.patterns.clone(),
        pipeline_cfg: cfg.pipeline.clone(),
        reconcile_cfg: cfg.reconcile.clone().unwrap_or_default(),
        shutdown_cfg: cfg
            .lifecycle
            .as_ref()
            .map(|l| l.to_shutdown_config())
            .unwrap_or_default(),
        cfg: cfg.coordinator.to_coordinator_config(),
    };

    Ok((Arc::new(Coordinator::new(deps)), paper_broker))
}
