//! Unconfirmed-transaction indexing core for an Electrum-style server over
//! an asset-bearing UTXO chain: mempool reconciliation, asset-script
//! parsing, fee histogram compaction, and the scripthash query surface.

#[macro_use]
extern crate error_chain;

pub mod asset;
pub mod chain;
pub mod config;
pub mod daemon;
pub mod errors;
pub mod metrics;
pub mod new_index;
pub mod supervisor;
pub mod util;
