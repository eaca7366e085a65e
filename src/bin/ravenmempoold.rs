//! Harness binary: wires config, logging, the daemon RPC client, and the
//! supervisor together and runs until a signal or a fatal collaborator
//! error. Follows `electrs`'s `src/bin/electrs.rs` shape (stderrlog setup,
//! signal-hook-driven shutdown, a single `tokio` multi-thread runtime).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use tokio::sync::RwLock;

use ravenmempool::config::Config;
use ravenmempool::daemon::Daemon;
use ravenmempool::metrics::Metrics;
use ravenmempool::new_index::{Mempool, MempoolApi, RpcMempoolApi, UtxoStore};
use ravenmempool::supervisor;
use ravenmempool::util::ScriptHash;

/// A placeholder `UtxoStore`: the persistent UTXO/asset database and tip
/// tracker are out of scope for this core (spec.md §1). This stub always
/// reports the mempool as already synced and never resolves an external
/// prevout, which is sufficient to drive the reconciler/histogram loop end
/// to end against a live node.
struct NullUtxoStore;

impl UtxoStore for NullUtxoStore {
    fn db_height(&self) -> u32 {
        0
    }

    fn lookup_utxo(
        &self,
        _prevout: &ravenmempool::chain::OutPoint,
    ) -> Option<(ScriptHash, u64)> {
        None
    }

    fn lookup_asset(
        &self,
        _prevout: &ravenmempool::chain::OutPoint,
    ) -> Option<(ScriptHash, u64, String)> {
        None
    }

    fn hash_script(&self, script: &[u8]) -> ScriptHash {
        use bitcoin::hashes::{sha256, Hash};
        ScriptHash(sha256::Hash::hash(script).to_byte_array())
    }
}

fn main() {
    let config = Arc::new(Config::from_args());

    stderrlog::new()
        .verbosity(config.verbose + 1)
        .timestamp(if config.timestamp {
            stderrlog::Timestamp::Millisecond
        } else {
            stderrlog::Timestamp::Off
        })
        .init()
        .expect("logging failed to initialize");

    info!("starting ravenmempoold");

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("ravenmempool-digest-{}", i))
        .build_global()
        .expect("failed to size the digester thread pool");

    let daemon = Arc::new(Daemon::new(&config).expect("failed to initialize daemon RPC client"));
    let store: Arc<dyn UtxoStore> = Arc::new(NullUtxoStore);
    let api: Arc<dyn MempoolApi> = Arc::new(RpcMempoolApi::new(daemon, store));
    let mempool = Arc::new(RwLock::new(Mempool::new()));
    let metrics = Arc::new(Metrics::new());

    let shutdown = Arc::new(AtomicBool::new(false));
    register_signal_handler(Arc::clone(&shutdown));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    runtime.block_on(async move {
        tokio::select! {
            _ = supervisor::run(config, api, mempool, metrics) => {}
            _ = wait_for_shutdown(shutdown) => {
                info!("shutdown signal received, terminating");
            }
        }
    });
}

fn register_signal_handler(shutdown: Arc<AtomicBool>) {
    let mut signals = signal_hook::iterator::Signals::new([
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
    ])
    .expect("failed to register signal handler");

    std::thread::spawn(move || {
        for _ in signals.forever() {
            shutdown.store(true, Ordering::SeqCst);
            break;
        }
    });
}

async fn wait_for_shutdown(shutdown: Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }
}
