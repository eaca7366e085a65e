use clap::{App, Arg};
use std::path::PathBuf;

use crate::chain::Network;

/// Mirrors `electrs::config::Config`: everything the core and its harness
/// binary need is parsed once at startup and handed around as `Arc<Config>`.
#[derive(Debug, Clone)]
pub struct Config {
    pub network_type: Network,
    pub daemon_rpc_addr: String,
    pub daemon_cookie_file: Option<PathBuf>,
    pub daemon_rpc_user: Option<String>,
    pub daemon_rpc_pass: Option<String>,

    /// C6 reconciler cadence, spec.md 4.6 (default 5s).
    pub mempool_refresh_secs: u64,
    /// Logging-task cadence, ambient (grounded in the original's
    /// `_logging`/`log_status_secs`, default 60s).
    pub mempool_log_status_secs: u64,
    /// C7 histogram cadence; chain-specific per spec.md 4.7/6
    /// (`MEMPOOL_HISTOGRAM_REFRESH_SECS`).
    pub mempool_histogram_refresh_secs: u64,
    /// Compaction bin size, spec.md 4.7.1 (default 100_000, open question
    /// resolved in SPEC_FULL.md 9: configurable, defaults unchanged).
    pub mempool_histogram_bin_size: u64,
    /// New-hash fetch batch size, spec.md 4.6 step 5 (default 200).
    pub mempool_fetch_batch_size: usize,

    pub verbose: usize,
    pub timestamp: bool,
}

impl Config {
    pub fn from_args() -> Config {
        let app = App::new("ravenmempoold")
            .about("Unconfirmed-transaction indexing core for a Ravencoin-family Electrum server")
            .arg(
                Arg::with_name("network")
                    .long("network")
                    .help("Select network type (mainnet/testnet/regtest)")
                    .takes_value(true)
                    .default_value("mainnet"),
            )
            .arg(
                Arg::with_name("daemon_rpc_addr")
                    .long("daemon-rpc-addr")
                    .help("Raven node JSON-RPC address (host:port)")
                    .takes_value(true)
                    .default_value("127.0.0.1:8766"),
            )
            .arg(
                Arg::with_name("cookie_file")
                    .long("cookie-file")
                    .help("Raven node cookie file for RPC auth")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("rpc_user")
                    .long("daemon-rpc-user")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("rpc_pass")
                    .long("daemon-rpc-pass")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("refresh_secs")
                    .long("mempool-refresh-secs")
                    .takes_value(true)
                    .default_value("5"),
            )
            .arg(
                Arg::with_name("log_status_secs")
                    .long("mempool-log-status-secs")
                    .takes_value(true)
                    .default_value("60"),
            )
            .arg(
                Arg::with_name("histogram_refresh_secs")
                    .long("mempool-histogram-refresh-secs")
                    .takes_value(true)
                    .default_value("30"),
            )
            .arg(
                Arg::with_name("histogram_bin_size")
                    .long("mempool-histogram-bin-size")
                    .takes_value(true)
                    .default_value("100000"),
            )
            .arg(
                Arg::with_name("fetch_batch_size")
                    .long("mempool-fetch-batch-size")
                    .takes_value(true)
                    .default_value("200"),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .multiple(true)
                    .help("Increase logging verbosity"),
            )
            .arg(Arg::with_name("timestamp").long("timestamp"));

        let matches = app.get_matches();

        let network_type = match matches.value_of("network").unwrap() {
            "mainnet" => Network::Bitcoin,
            "testnet" => Network::Testnet,
            "regtest" => Network::Regtest,
            other => panic!("unsupported network: {}", other),
        };

        Config {
            network_type,
            daemon_rpc_addr: matches.value_of("daemon_rpc_addr").unwrap().to_owned(),
            daemon_cookie_file: matches
                .value_of("cookie_file")
                .map(PathBuf::from)
                .or_else(|| default_cookie_path(network_type)),
            daemon_rpc_user: matches.value_of("rpc_user").map(str::to_owned),
            daemon_rpc_pass: matches.value_of("rpc_pass").map(str::to_owned),
            mempool_refresh_secs: matches
                .value_of("refresh_secs")
                .unwrap()
                .parse()
                .expect("invalid --mempool-refresh-secs"),
            mempool_log_status_secs: matches
                .value_of("log_status_secs")
                .unwrap()
                .parse()
                .expect("invalid --mempool-log-status-secs"),
            mempool_histogram_refresh_secs: matches
                .value_of("histogram_refresh_secs")
                .unwrap()
                .parse()
                .expect("invalid --mempool-histogram-refresh-secs"),
            mempool_histogram_bin_size: matches
                .value_of("histogram_bin_size")
                .unwrap()
                .parse()
                .expect("invalid --mempool-histogram-bin-size"),
            mempool_fetch_batch_size: matches
                .value_of("fetch_batch_size")
                .unwrap()
                .parse()
                .expect("invalid --mempool-fetch-batch-size"),
            verbose: matches.occurrences_of("verbose") as usize,
            timestamp: matches.is_present("timestamp"),
        }
    }
}

/// Falls back to the node's default per-network cookie file under the
/// user's home directory when `--cookie-file` is not given and no
/// user/pass pair was supplied either, matching how a bitcoind-family
/// daemon lays out its datadir.
fn default_cookie_path(network: Network) -> Option<PathBuf> {
    let mut datadir = dirs::home_dir()?;
    datadir.push(".raven");
    match network {
        Network::Testnet => datadir.push("testnet4"),
        Network::Regtest => datadir.push("regtest"),
        _ => {}
    }
    datadir.push(".cookie");
    Some(datadir)
}
