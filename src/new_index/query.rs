//! C8 facade: a thin `Arc<RwLock<Mempool>>` wrapper exposing the read-only
//! query surface, following `electrs::new_index::Query`'s
//! lock-then-delegate pattern (the teacher's `query.rs` held `Arc<ChainQuery>`
//! + `Arc<RwLock<Mempool>>` and forwarded every read through a short-lived
//! read guard; this core has no chain/DB half, only the mempool one).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::chain::OutPoint;
use crate::util::ScriptHash;

use super::mempool::{MempoolAssetUtxo, MempoolUtxo};
use super::{AssetIssuance, AssetName, MemPoolTxSummary, Mempool};

pub struct Query {
    mempool: Arc<RwLock<Mempool>>,
}

impl Query {
    pub fn new(mempool: Arc<RwLock<Mempool>>) -> Self {
        Query { mempool }
    }

    pub fn mempool(&self) -> &Arc<RwLock<Mempool>> {
        &self.mempool
    }

    pub async fn balance_delta(&self, sh: &ScriptHash) -> i64 {
        self.mempool.read().await.balance_delta(sh)
    }

    pub async fn asset_balance_delta(&self, sh: &ScriptHash) -> HashMap<AssetName, i64> {
        self.mempool.read().await.asset_balance_delta(sh)
    }

    pub async fn potential_spends(&self, sh: &ScriptHash) -> HashSet<OutPoint> {
        self.mempool.read().await.potential_spends(sh)
    }

    pub async fn transaction_summaries(&self, sh: &ScriptHash) -> Vec<MemPoolTxSummary> {
        self.mempool.read().await.transaction_summaries(sh)
    }

    pub async fn unordered_utxos(&self, sh: &ScriptHash) -> Vec<MempoolUtxo> {
        self.mempool.read().await.unordered_utxos(sh)
    }

    pub async fn unordered_assets(&self, sh: &ScriptHash) -> Vec<MempoolAssetUtxo> {
        self.mempool.read().await.unordered_assets(sh)
    }

    pub async fn compact_fee_histogram(&self) -> Vec<(f64, u64)> {
        self.mempool.read().await.compact_fee_histogram().to_vec()
    }

    pub async fn get_asset_creation_if_any(&self, name: &str) -> Option<AssetIssuance> {
        self.mempool
            .read()
            .await
            .get_asset_creation_if_any(name)
            .cloned()
    }

    pub async fn get_asset_reissues_if_any(&self, name: &str) -> Option<AssetIssuance> {
        self.mempool
            .read()
            .await
            .get_asset_reissues_if_any(name)
            .cloned()
    }
}
