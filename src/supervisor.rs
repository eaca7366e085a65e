//! C9: composes the reconciler, histogram engine, and logger into three
//! long-lived `tokio` tasks sharing a "synchronized" edge signal (spec.md
//! §5, §9 open question on the signal's edge-vs-level semantics). Grounded
//! in the teacher's task-per-concern split (electrs daemon's separate sync
//! loop) generalized from a thread-per-task model to `tokio::spawn`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::{Notify, RwLock};

use crate::config::Config;
use crate::metrics::{Metrics, MetricOpts};
use crate::new_index::{Mempool, MempoolApi};
use crate::util::ScriptHash;

/// Runs until the collaborator reports a fatal error, at which point it
/// returns — the caller (the harness binary) treats that as "terminate the
/// core" per spec.md §7's "collaborator failure" taxonomy entry.
pub async fn run(
    config: Arc<Config>,
    api: Arc<dyn MempoolApi>,
    mempool: Arc<RwLock<Mempool>>,
    metrics: Arc<Metrics>,
) {
    let synchronized = Arc::new(Notify::new());

    let cycle_latency = metrics.histogram_vec(
        prometheus::HistogramOpts::new(
            "mempool_reconcile_cycle_seconds",
            "Time spent in one reconciler cycle (diff + ingest + accept)",
        ),
        &["outcome"],
    );
    let tx_count_gauge = metrics.gauge(MetricOpts::new(
        "mempool_tx_count",
        "Number of transactions currently indexed in the mempool",
    ));

    let mut reconciler = tokio::spawn(reconciler_task(
        Arc::clone(&config),
        Arc::clone(&api),
        Arc::clone(&mempool),
        Arc::clone(&synchronized),
        cycle_latency,
    ));
    let mut histogram = tokio::spawn(histogram_task(
        Arc::clone(&config),
        Arc::clone(&mempool),
        Arc::clone(&synchronized),
    ));
    let mut logger = tokio::spawn(logger_task(
        Arc::clone(&config),
        Arc::clone(&mempool),
        Arc::clone(&synchronized),
        tx_count_gauge,
    ));

    // Cancellation (spec.md §5): whichever task exits first, the other two
    // are aborted so the core terminates as a unit.
    tokio::select! {
        res = &mut reconciler => { log_join("reconciler", res); histogram.abort(); logger.abort(); }
        res = &mut histogram => { log_join("histogram", res); reconciler.abort(); logger.abort(); }
        res = &mut logger => { log_join("logger", res); reconciler.abort(); histogram.abort(); }
    }
}

fn log_join(name: &str, res: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        if e.is_cancelled() {
            info!("{} task cancelled", name);
        } else {
            error!("{} task panicked: {}", name, e);
        }
    } else {
        info!("{} task exited", name);
    }
}

/// C6's cadence loop: snapshot height, diff against the node, process,
/// publish. Accumulators persist across retried cycles (spec.md §4.6). The
/// height-skew guard `continue`s without sleeping; every other path sleeps
/// `refresh_secs` once per iteration, matching `_refresh_hashes`.
async fn reconciler_task(
    config: Arc<Config>,
    api: Arc<dyn MempoolApi>,
    mempool: Arc<RwLock<Mempool>>,
    synchronized: Arc<Notify>,
    cycle_latency: prometheus::HistogramVec,
) {
    let mut touched: HashSet<ScriptHash> = HashSet::new();
    let mut assets_touched: HashSet<String> = HashSet::new();

    loop {
        let cycle_start = std::time::Instant::now();
        let cached_height = api.cached_height();
        let hashes = match api.mempool_hashes().await {
            Ok(h) => h,
            Err(e) => {
                error!("reconciler: mempool_hashes failed: {}", e);
                tokio::time::sleep(Duration::from_secs(config.mempool_refresh_secs)).await;
                continue;
            }
        };
        let height_after = match api.height().await {
            Ok(h) => h,
            Err(e) => {
                error!("reconciler: height failed: {}", e);
                tokio::time::sleep(Duration::from_secs(config.mempool_refresh_secs)).await;
                continue;
            }
        };
        if height_after != cached_height && cached_height != 0 {
            // Height skew guard (spec.md §4.6 step 3 / §7): retry
            // immediately, no sleep, accumulators untouched.
            continue;
        }

        let all_hashes: HashSet<_> = hashes.into_iter().collect();

        let mut guard = mempool.write().await;
        let result = guard
            .process_mempool(
                &api,
                all_hashes,
                height_after,
                &mut touched,
                &mut assets_touched,
                config.mempool_fetch_batch_size,
            )
            .await;
        drop(guard);

        match result {
            Ok(()) => {
                synchronized.notify_waiters();
                let publish_touched = std::mem::take(&mut touched);
                let publish_assets = std::mem::take(&mut assets_touched);
                if let Err(e) = api
                    .on_mempool(publish_touched, height_after, publish_assets)
                    .await
                {
                    error!("reconciler: on_mempool failed: {}", e);
                }
                cycle_latency
                    .with_label_values(&["ok"])
                    .observe(cycle_start.elapsed().as_secs_f64());
            }
            Err(e) => {
                // DBSyncError (or any other recoverable failure): retry
                // next cycle, accumulators preserved.
                debug!("reconciler: process_mempool deferred: {}", e);
                cycle_latency
                    .with_label_values(&["deferred"])
                    .observe(cycle_start.elapsed().as_secs_f64());
            }
        }

        tokio::time::sleep(Duration::from_secs(config.mempool_refresh_secs)).await;
    }
}

/// C7: waits for the reconciler's edge, refreshes the histogram, then
/// sleeps its own cadence before waiting for the next edge again
/// (`_refresh_histogram`).
async fn histogram_task(
    config: Arc<Config>,
    mempool: Arc<RwLock<Mempool>>,
    synchronized: Arc<Notify>,
) {
    loop {
        synchronized.notified().await;
        {
            let mut guard = mempool.write().await;
            guard.refresh_histogram(config.mempool_histogram_bin_size);
        }
        tokio::time::sleep(Duration::from_secs(config.mempool_histogram_refresh_secs)).await;
    }
}

/// Ambient periodic status line (grounded in the original's `_logging`
/// task), not named as a distinct component in spec.md but required by its
/// ambient-stack carry-over rule. Waits for the first sync edge before its
/// first report, then alternates sleep/wait like the original.
async fn logger_task(
    config: Arc<Config>,
    mempool: Arc<RwLock<Mempool>>,
    synchronized: Arc<Notify>,
    tx_count_gauge: prometheus::Gauge,
) {
    info!("beginning processing of daemon mempool. This can take some time...");
    let start = std::time::Instant::now();
    synchronized.notified().await;
    info!("synced in {:.2}s", start.elapsed().as_secs_f64());

    loop {
        let guard = mempool.read().await;
        let tx_count = guard.tx_count();
        info!(
            "{} tx(s) touching {} scripthash(es)",
            tx_count,
            guard.hashx_count()
        );
        drop(guard);
        tx_count_gauge.set(tx_count as f64);
        tokio::time::sleep(Duration::from_secs(config.mempool_log_status_secs)).await;
        synchronized.notified().await;
    }
}
