//! Shared data-model types for the mempool indexing core (spec.md §3),
//! following `electrs`'s convention of keeping the index-facing record
//! types in `new_index::mod` and the behavior in sibling submodules.

pub mod api;
pub mod mempool;
pub mod query;

pub use api::{RpcMempoolApi, UtxoStore};
pub use mempool::{MemPoolTx, MemPoolTxSummary, Mempool, MempoolApi};
pub use query::Query;

use std::collections::{HashMap, HashSet};

use serde_derive::Serialize;

use crate::chain::Txid;
pub use crate::util::ScriptHash;

/// Chain-level asset names are short ASCII identifiers (Ravencoin caps them
/// well under 255 bytes; the original's `read_var_bytes` only ever needs a
/// single compact-size length byte for real assets).
pub type AssetName = String;

pub fn is_valid_asset_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 32 && name.is_ascii()
}

/// Tagged replacement for the Python `(hashX, value, is_asset, asset_name)`
/// 4-tuple (spec.md §9 "Dynamic tuple fields → tagged record").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Coin(u64),
    Asset(AssetName, u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPair {
    pub script_hash: ScriptHash,
    pub kind: ValueKind,
}

impl OutputPair {
    pub fn coin(script_hash: ScriptHash, value: u64) -> Self {
        OutputPair {
            script_hash,
            kind: ValueKind::Coin(value),
        }
    }

    pub fn asset(script_hash: ScriptHash, name: AssetName, value: u64) -> Self {
        OutputPair {
            script_hash,
            kind: ValueKind::Asset(name, value),
        }
    }

    pub fn value(&self) -> u64 {
        match &self.kind {
            ValueKind::Coin(v) => *v,
            ValueKind::Asset(_, v) => *v,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self.kind, ValueKind::Asset(..))
    }

    pub fn asset_name(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Asset(name, _) => Some(name),
            ValueKind::Coin(_) => None,
        }
    }
}

/// `{tx_hash, tx_pos, height: -1}` per spec.md §3; height -1 marks
/// mempool-origin, matching the original's literal `'height': -1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetIssuanceSource {
    pub tx_hash: Txid,
    pub tx_pos: u32,
    pub height: i32,
}

impl AssetIssuanceSource {
    pub const MEMPOOL_HEIGHT: i32 = -1;

    pub fn mempool(tx_hash: Txid, tx_pos: u32) -> Self {
        AssetIssuanceSource {
            tx_hash,
            tx_pos,
            height: Self::MEMPOOL_HEIGHT,
        }
    }
}

/// Metadata for a newly-created or reissued asset, spec.md §3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetIssuance {
    pub sats_in_circulation: u64,
    pub divisions: u8,
    pub reissuable: bool,
    pub has_ipfs: bool,
    pub ipfs: Option<String>,
    pub source: AssetIssuanceSource,
}

/// Bundles `asset_creates`/`asset_reissues` with their reverse indices
/// (`tx_to_asset_create`/`tx_to_asset_reissue`) behind insert/remove
/// primitives that keep both sides in lockstep, per spec.md §9's redesign
/// note on the forward/reverse-index duality.
#[derive(Debug, Default)]
pub struct AssetIndex {
    creates: HashMap<AssetName, AssetIssuance>,
    reissues: HashMap<AssetName, AssetIssuance>,
    tx_to_create: HashMap<Txid, HashSet<AssetName>>,
    tx_to_reissue: HashMap<Txid, HashSet<AssetName>>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_create(&mut self, tx_hash: Txid, name: AssetName, issuance: AssetIssuance) {
        self.tx_to_create
            .entry(tx_hash)
            .or_default()
            .insert(name.clone());
        self.creates.insert(name, issuance);
    }

    /// Reissue chaining is forbidden (spec.md §3 invariant): at most one
    /// entry per asset name is ever live, so a fresh reissue simply
    /// overwrites (last-writer-wins within a batch, per spec.md §4.2).
    pub fn insert_reissue(&mut self, tx_hash: Txid, name: AssetName, issuance: AssetIssuance) {
        self.tx_to_reissue
            .entry(tx_hash)
            .or_default()
            .insert(name.clone());
        self.reissues.insert(name, issuance);
    }

    /// Remove every asset record introduced by `tx_hash`, returning the set
    /// of asset names that changed (to be unioned into `assets_touched`).
    pub fn remove_for_tx(&mut self, tx_hash: &Txid) -> HashSet<AssetName> {
        let mut touched = HashSet::new();
        if let Some(names) = self.tx_to_reissue.remove(tx_hash) {
            for name in &names {
                self.reissues.remove(name);
            }
            touched.extend(names);
        }
        if let Some(names) = self.tx_to_create.remove(tx_hash) {
            for name in &names {
                self.creates.remove(name);
            }
            touched.extend(names);
        }
        touched
    }

    pub fn touched_by(&self, tx_hash: &Txid) -> HashSet<AssetName> {
        let mut touched = HashSet::new();
        if let Some(names) = self.tx_to_create.get(tx_hash) {
            touched.extend(names.iter().cloned());
        }
        if let Some(names) = self.tx_to_reissue.get(tx_hash) {
            touched.extend(names.iter().cloned());
        }
        touched
    }

    pub fn get_creation(&self, name: &str) -> Option<&AssetIssuance> {
        self.creates.get(name)
    }

    pub fn get_reissuance(&self, name: &str) -> Option<&AssetIssuance> {
        self.reissues.get(name)
    }

    #[cfg(test)]
    pub fn creates_len(&self) -> usize {
        self.creates.len()
    }

    #[cfg(test)]
    pub fn reissues_len(&self) -> usize {
        self.reissues.len()
    }
}
