//! `RpcMempoolApi`: the concrete `MempoolApi` collaborator (spec.md §6),
//! combining the node-RPC `Daemon` with a persistent-store lookup trait.
//! The store itself (`rocksdb`-backed UTXO/asset index, tip tracking) is
//! explicitly out of scope (spec.md §1); `UtxoStore` only names the shape
//! the core needs from it, the same way `electrs::new_index::ChainQuery`
//! sits between `Mempool` and the on-disk store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use crate::chain::{OutPoint, Txid};
use crate::daemon::Daemon;
use crate::errors::*;
use crate::util::{hex_str_to_txid, ScriptHash};

use super::mempool::MempoolApi;
use super::AssetName;

/// The persistent-store half of the collaborator: everything the core
/// needs from the flushed UTXO/asset database plus chain configuration.
/// Out of scope to implement (spec.md §1); kept as a trait so
/// `RpcMempoolApi` has a real seam to depend on instead of baking a
/// concrete store dependency into the mempool core.
pub trait UtxoStore: Send + Sync {
    fn db_height(&self) -> u32;
    fn lookup_utxo(&self, prevout: &OutPoint) -> Option<(ScriptHash, u64)>;
    fn lookup_asset(&self, prevout: &OutPoint) -> Option<(ScriptHash, u64, AssetName)>;
    fn hash_script(&self, script: &[u8]) -> ScriptHash;
}

pub struct RpcMempoolApi {
    daemon: Arc<Daemon>,
    store: Arc<dyn UtxoStore>,
    cached_height: AtomicU32,
}

impl RpcMempoolApi {
    pub fn new(daemon: Arc<Daemon>, store: Arc<dyn UtxoStore>) -> Self {
        RpcMempoolApi {
            daemon,
            store,
            cached_height: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl MempoolApi for RpcMempoolApi {
    async fn height(&self) -> Result<u32> {
        let daemon = Arc::clone(&self.daemon);
        let height =
            tokio::task::spawn_blocking(move || daemon.getblockcount())
                .await
                .chain_err(|| "height: task panicked")??;
        self.cached_height.store(height, Ordering::Relaxed);
        Ok(height)
    }

    fn cached_height(&self) -> u32 {
        self.cached_height.load(Ordering::Relaxed)
    }

    fn db_height(&self) -> u32 {
        self.store.db_height()
    }

    async fn mempool_hashes(&self) -> Result<Vec<Txid>> {
        let daemon = Arc::clone(&self.daemon);
        let hex_hashes =
            tokio::task::spawn_blocking(move || daemon.getrawmempool())
                .await
                .chain_err(|| "mempool_hashes: task panicked")??;
        hex_hashes.iter().map(|h| hex_str_to_txid(h)).collect()
    }

    async fn raw_transactions(&self, hashes: &[Txid]) -> Result<Vec<Option<Vec<u8>>>> {
        let daemon = Arc::clone(&self.daemon);
        let hex_hashes: Vec<String> = hashes
            .iter()
            .map(|h| crate::util::hash_to_hex_str(h))
            .collect();
        tokio::task::spawn_blocking(move || {
            hex_hashes
                .iter()
                .map(|h| daemon.getrawtransaction(h))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .chain_err(|| "raw_transactions: task panicked")?
    }

    async fn lookup_utxos(&self, prevouts: &[OutPoint]) -> Result<Vec<Option<(ScriptHash, u64)>>> {
        Ok(prevouts.iter().map(|op| self.store.lookup_utxo(op)).collect())
    }

    async fn lookup_assets(
        &self,
        prevouts: &[OutPoint],
    ) -> Result<Vec<Option<(ScriptHash, u64, AssetName)>>> {
        Ok(prevouts
            .iter()
            .map(|op| self.store.lookup_asset(op))
            .collect())
    }

    async fn on_mempool(
        &self,
        touched: HashSet<ScriptHash>,
        height: u32,
        assets: HashSet<AssetName>,
    ) -> Result<()> {
        warn!(
            "mempool publish: {} scripthash(es), {} asset(s) touched at height {}",
            touched.len(),
            assets.len(),
            height
        );
        Ok(())
    }

    fn hash_script(&self, script: &[u8]) -> ScriptHash {
        self.store.hash_script(script)
    }
}
