//! TransGuard driver: runs the pipeline one step per interval, keeps a scored
//! window, and logs alerts and a window summary after every step.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use transguard::{
    config::{AppConfig, ConfigSource},
    logging::StructuredLogger,
    pipeline::Pipeline,
    risk::RiskEngine,
    storage::ScoredWindow,
};

static STOP: AtomicBool = AtomicBool::new(false);

fn run_one_step(
    pipeline: &mut Pipeline,
    window: &mut ScoredWindow,
    risk: &RiskEngine,
    emit_records: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let records = pipeline.step()?;

    for r in records.iter().filter(|r| risk.is_alert(r.score)) {
        info!(
            tx_id = %r.meta.tx_id,
            sender = %r.meta.sender_id,
            receiver = %r.meta.receiver_id,
            amount = r.meta.amount,
            score = r.score,
            level = ?risk.level(r.score),
            "alert"
        );
    }

    if emit_records {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for r in &records {
            StructuredLogger::emit_json(r, &mut out)?;
        }
    }

    let evicted = window.append(records, Utc::now());
    let summary = window.summary(risk);
    info!(
        in_window = summary.total,
        alerts = summary.alerts,
        mean_score = summary.mean_score,
        status = summary.status.label(),
        evicted,
        "window summary"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("TRANSGUARD_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let (config, source) = AppConfig::load_with_source(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);
    if source == ConfigSource::Defaults {
        info!(path = %config_path.display(), "config not found; using defaults");
    }
    info!(
        seed = config.simulator.seed,
        tx_per_second = config.simulator.tx_per_second,
        window_seconds = config.window.window_seconds,
        alert_threshold = config.risk.alert_threshold,
        "TransGuard starting"
    );

    let risk = RiskEngine::new(config.risk.clone());
    let mut window = ScoredWindow::new(config.window.window_seconds);
    let interval = config.driver.interval_secs;
    let max_steps = config.driver.max_steps;
    let emit_records = config.driver.emit_records;
    let mut pipeline = Pipeline::new(config)?;

    if let Err(e) = ctrlc::set_handler(|| STOP.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }

    let mut step: u64 = 0;
    while !STOP.load(Ordering::Relaxed) {
        step += 1;
        run_one_step(&mut pipeline, &mut window, &risk, emit_records)?;
        if max_steps > 0 && step >= max_steps {
            break;
        }
        for _ in 0..interval {
            if STOP.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    let stats = pipeline.simulator().stats();
    info!(
        steps = step,
        events = stats.events,
        bursts = stats.bursts,
        injected = stats.injected,
        senders = pipeline.featurizer().sender_count(),
        "TransGuard stopping"
    );
    Ok(())
}
