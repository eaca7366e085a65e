//! C3 (transaction digester), C4 (prevout resolver), C5 (acceptance engine),
//! C6 (reconciler), C7 (histogram engine), and C8 (query surface). Grounded
//! in `electrumx.server.mempool.MemPool` (`examples/original_source/electrumx/
//! server/mempool.py`): `_accept_transactions`, `_refresh_hashes`/
//! `_process_mempool`, `_fetch_and_accept`, `_update_histogram`/
//! `_compress_histogram`, and the async query methods. Indexing idiom
//! (`Arc<RwLock<..>>`-guarded state, Prometheus fields) follows
//! `examples/other_examples/bb702b27_..mempool.rs.rs`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use log::{debug, error};
use rayon::prelude::*;
use serde_derive::Serialize;

use crate::chain::{OutPoint, Txid};
use crate::errors::*;
use crate::util::{chunks, ScriptHash};

use super::{AssetIndex, AssetIssuance, AssetName, OutputPair, ValueKind};

/// The single abstract collaborator the core consumes (spec.md §6):
/// node-RPC operations and persistent-store lookups behind one interface,
/// so the reconciler (§4.6) never distinguishes where an answer came from.
#[async_trait]
pub trait MempoolApi: Send + Sync {
    async fn height(&self) -> Result<u32>;
    fn cached_height(&self) -> u32;
    fn db_height(&self) -> u32;
    async fn mempool_hashes(&self) -> Result<Vec<Txid>>;
    async fn raw_transactions(&self, hashes: &[Txid]) -> Result<Vec<Option<Vec<u8>>>>;
    async fn lookup_utxos(&self, prevouts: &[OutPoint]) -> Result<Vec<Option<(ScriptHash, u64)>>>;
    async fn lookup_assets(
        &self,
        prevouts: &[OutPoint],
    ) -> Result<Vec<Option<(ScriptHash, u64, AssetName)>>>;
    async fn on_mempool(
        &self,
        touched: HashSet<ScriptHash>,
        height: u32,
        assets: HashSet<AssetName>,
    ) -> Result<()>;
    fn hash_script(&self, script: &[u8]) -> ScriptHash;
}

/// spec.md §3 `MemPoolTx`.
#[derive(Debug, Clone)]
pub struct MemPoolTx {
    pub prevouts: Vec<OutPoint>,
    pub in_pairs: Option<Vec<OutputPair>>,
    pub out_pairs: Vec<OutputPair>,
    pub fee: u64,
    pub size: u32,
}

/// spec.md §3 `MemPoolTxSummary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemPoolTxSummary {
    pub tx_hash: Txid,
    pub fee: u64,
    pub has_unconfirmed_inputs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MempoolUtxo {
    pub tx_hash: Txid,
    pub tx_pos: u32,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MempoolAssetUtxo {
    pub tx_hash: Txid,
    pub tx_pos: u32,
    pub asset_name: AssetName,
    pub value: u64,
}

/// The process-wide mempool state, exclusively owned by the reconciler
/// (spec.md §9 "process-wide mempool state → one owner"). Callers hold it
/// behind `Arc<tokio::sync::RwLock<Mempool>>`; every method here assumes the
/// caller already holds the appropriate lock.
pub struct Mempool {
    txs: HashMap<Txid, MemPoolTx>,
    hash_xs: HashMap<ScriptHash, HashSet<Txid>>,
    assets: AssetIndex,
    cached_compact_histogram: Vec<(f64, u64)>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool {
            txs: HashMap::new(),
            hash_xs: HashMap::new(),
            assets: AssetIndex::new(),
            cached_compact_histogram: Vec::new(),
        }
    }

    pub fn tx_count(&self) -> usize {
        self.txs.len()
    }

    pub fn hashx_count(&self) -> usize {
        self.hash_xs.len()
    }

    // ---- C3: transaction digester -------------------------------------

    /// Deserializes one raw tx and runs C2 over every output. Pure and
    /// CPU-bound; callers fan this out via rayon off the reconciler's
    /// critical path (spec.md §4.3, §5).
    fn digest_one(
        tx_hash: Txid,
        raw: &[u8],
        hash_script: &(dyn Fn(&[u8]) -> ScriptHash + Sync),
    ) -> Result<(MemPoolTx, Vec<(bool, AssetName, AssetIssuance)>)> {
        let (tx, size) = crate::chain::read_tx(raw)?;

        let prevouts: Vec<OutPoint> = tx
            .input
            .iter()
            .filter(|txin| crate::chain::has_prevout(txin))
            .map(|txin| txin.previous_output)
            .collect();

        let mut out_pairs = Vec::with_capacity(tx.output.len());
        let mut events = Vec::new();
        for (vout, txout) in tx.output.iter().enumerate() {
            let parsed = crate::asset::parse_output_script(
                txout.script_pubkey.as_bytes(),
                txout.value.to_sat(),
                tx_hash,
                vout as u32,
                hash_script,
            );
            out_pairs.push(parsed.pair);
            match parsed.event {
                crate::asset::AssetEvent::Create(name, issuance) => {
                    events.push((false, name, issuance))
                }
                crate::asset::AssetEvent::Reissue(name, issuance) => {
                    events.push((true, name, issuance))
                }
                crate::asset::AssetEvent::None => {}
            }
        }

        Ok((
            MemPoolTx {
                prevouts,
                in_pairs: None,
                out_pairs,
                fee: 0,
                size,
            },
            events,
        ))
    }

    // ---- C3 + C4: batch fetch and resolve ------------------------------

    /// Fetches and digests one chunk of new hashes, then resolves every
    /// prevout that does not belong to this cycle's own batch (spec.md
    /// §4.4). Independent of `self` so the caller can run many chunks
    /// concurrently as their own tasks (spec.md §4.6 step 5, mirroring the
    /// original's `TaskGroup`/`group.spawn` fan-out) instead of one chunk
    /// at a time; the caller commits the returned asset-issuance events
    /// into the shared index afterward — mirroring `_fetch_and_accept`,
    /// which records `asset_creates`/`asset_reissues` as soon as a tx is
    /// digested regardless of whether C5 later accepts or defers it.
    async fn fetch_and_digest(
        api: Arc<dyn MempoolApi>,
        hashes: Vec<Txid>,
        all_hashes: Arc<HashSet<Txid>>,
    ) -> Result<(
        Vec<(Txid, MemPoolTx, Vec<(bool, AssetName, AssetIssuance)>)>,
        HashMap<OutPoint, OutputPair>,
    )> {
        let raw_txs = api.raw_transactions(&hashes).await?;

        let pairs: Vec<(Txid, Vec<u8>)> = hashes
            .into_iter()
            .zip(raw_txs)
            .filter_map(|(h, raw)| raw.map(|r| (h, r)))
            .collect();

        // The rayon fan-out runs inside `spawn_blocking`: `par_iter` blocks
        // its calling thread until every item finishes, and that calling
        // thread would otherwise be a tokio worker (spec.md §4.3/§5's "off
        // the reconciler's critical path").
        let api_for_digest = Arc::clone(&api);
        let digested: Vec<(Txid, MemPoolTx, Vec<(bool, AssetName, AssetIssuance)>)> =
            tokio::task::spawn_blocking(move || {
                let hash_script = |s: &[u8]| api_for_digest.hash_script(s);
                pairs
                    .par_iter()
                    .filter_map(|(tx_hash, raw)| {
                        match Self::digest_one(*tx_hash, raw, &hash_script) {
                            Ok((tx, events)) => Some((*tx_hash, tx, events)),
                            Err(e) => {
                                debug!("skipping tx {}: {}", tx_hash, e);
                                None
                            }
                        }
                    })
                    .collect()
            })
            .await
            .chain_err(|| "digest: task panicked")?;

        let prevouts: Vec<OutPoint> = digested
            .iter()
            .flat_map(|(_, tx, _)| tx.prevouts.iter().cloned())
            .filter(|op| !all_hashes.contains(&op.txid))
            .collect();

        let mut utxo_map = HashMap::new();
        if !prevouts.is_empty() {
            let coins = api.lookup_utxos(&prevouts).await?;
            for (op, lookup) in prevouts.iter().zip(coins) {
                if let Some((sh, value)) = lookup {
                    utxo_map.insert(*op, OutputPair::coin(sh, value));
                }
            }
            let assets = api.lookup_assets(&prevouts).await?;
            for (op, lookup) in prevouts.iter().zip(assets) {
                if let Some((sh, value, name)) = lookup {
                    utxo_map.insert(*op, OutputPair::asset(sh, name, value));
                }
            }
        }

        Ok((digested, utxo_map))
    }

    // ---- C5: acceptance engine ------------------------------------------

    /// One acceptance pass. Returns the still-deferred txs and the subset
    /// of `utxo_map` not yet consumed, so the caller can feed them back
    /// through another pass (spec.md §4.5's fixed-point loop).
    fn accept_transactions(
        &mut self,
        tx_map: HashMap<Txid, MemPoolTx>,
        utxo_map: HashMap<OutPoint, OutputPair>,
        touched: &mut HashSet<ScriptHash>,
        assets_touched: &mut HashSet<AssetName>,
    ) -> (HashMap<Txid, MemPoolTx>, HashMap<OutPoint, OutputPair>) {
        let mut deferred = HashMap::new();
        let mut consumed: HashSet<OutPoint> = HashSet::new();

        let ordered: Vec<Txid> = tx_map.keys().cloned().sorted().collect();

        let mut tx_map = tx_map;
        for tx_hash in ordered {
            let mut tx = tx_map.remove(&tx_hash).unwrap();

            let mut in_pairs = Vec::with_capacity(tx.prevouts.len());
            let mut resolvable = true;
            for prevout in &tx.prevouts {
                let pair = if let Some(p) = utxo_map.get(prevout) {
                    p.clone()
                } else if let Some(prev_tx) = self.txs.get(&prevout.txid) {
                    match prev_tx.out_pairs.get(prevout.vout as usize) {
                        Some(p) => p.clone(),
                        None => {
                            resolvable = false;
                            break;
                        }
                    }
                } else {
                    resolvable = false;
                    break;
                };
                in_pairs.push(pair);
            }

            if !resolvable {
                deferred.insert(tx_hash, tx);
                continue;
            }

            consumed.extend(tx.prevouts.iter().cloned());

            let in_coin: u64 = in_pairs
                .iter()
                .filter(|p| !p.is_asset())
                .map(|p| p.value())
                .sum();
            let out_coin: u64 = tx
                .out_pairs
                .iter()
                .filter(|p| !p.is_asset())
                .map(|p| p.value())
                .sum();
            tx.fee = in_coin.saturating_sub(out_coin);

            let mut tx_script_hashes: HashSet<ScriptHash> = HashSet::new();
            for p in &in_pairs {
                tx_script_hashes.insert(p.script_hash);
            }
            for p in &tx.out_pairs {
                tx_script_hashes.insert(p.script_hash);
            }
            tx.in_pairs = Some(in_pairs);

            for sh in &tx_script_hashes {
                self.hash_xs.entry(*sh).or_default().insert(tx_hash);
            }
            touched.extend(tx_script_hashes);

            assets_touched.extend(self.assets.touched_by(&tx_hash));

            self.txs.insert(tx_hash, tx);
        }

        let remaining_utxo_map = utxo_map
            .into_iter()
            .filter(|(op, _)| !consumed.contains(op))
            .collect();

        (deferred, remaining_utxo_map)
    }

    fn evict(
        &mut self,
        gone: &HashSet<Txid>,
        touched: &mut HashSet<ScriptHash>,
        assets_touched: &mut HashSet<AssetName>,
    ) {
        for tx_hash in gone {
            if let Some(tx) = self.txs.remove(tx_hash) {
                let mut tx_hashxs: HashSet<ScriptHash> = HashSet::new();
                if let Some(pairs) = &tx.in_pairs {
                    for p in pairs {
                        tx_hashxs.insert(p.script_hash);
                    }
                }
                for p in &tx.out_pairs {
                    tx_hashxs.insert(p.script_hash);
                }
                for sh in &tx_hashxs {
                    if let Some(set) = self.hash_xs.get_mut(sh) {
                        set.remove(tx_hash);
                        if set.is_empty() {
                            self.hash_xs.remove(sh);
                        }
                    }
                }
                touched.extend(tx_hashxs);
            }
            assets_touched.extend(self.assets.remove_for_tx(tx_hash));
        }
    }

    // ---- C6: reconciler body --------------------------------------------

    /// `_process_mempool`: diff, evict, ingest, accept to fixed point.
    /// Called once per refresh cycle under the mempool lock (spec.md §4.6
    /// step 5).
    pub async fn process_mempool(
        &mut self,
        api: &Arc<dyn MempoolApi>,
        all_hashes: HashSet<Txid>,
        mempool_height: u32,
        touched: &mut HashSet<ScriptHash>,
        assets_touched: &mut HashSet<AssetName>,
        fetch_batch_size: usize,
    ) -> Result<()> {
        if mempool_height != api.db_height() {
            bail!(ErrorKind::DbSync);
        }

        let gone: HashSet<Txid> = self
            .txs
            .keys()
            .cloned()
            .filter(|h| !all_hashes.contains(h))
            .collect();
        self.evict(&gone, touched, assets_touched);

        let new_hashes: Vec<Txid> = all_hashes
            .iter()
            .cloned()
            .filter(|h| !self.txs.contains_key(h))
            .sorted()
            .collect();
        if new_hashes.is_empty() {
            return Ok(());
        }

        let all_hashes = Arc::new(all_hashes);

        // C3+C4: every chunk fetches, digests and resolves as its own task
        // so the whole new-hash batch ingests concurrently (spec.md §4.6
        // step 5's "TaskGroup"/"group.spawn") instead of one chunk at a time.
        let mut fetches = tokio::task::JoinSet::new();
        for chunk in chunks(&new_hashes, fetch_batch_size) {
            let api = Arc::clone(api);
            let all_hashes = Arc::clone(&all_hashes);
            fetches.spawn(Self::fetch_and_digest(api, chunk, all_hashes));
        }

        let mut tx_map = HashMap::new();
        let mut utxo_map = HashMap::new();
        while let Some(joined) = fetches.join_next().await {
            let (digested, chunk_utxos) = joined.chain_err(|| "fetch task panicked")??;
            for (tx_hash, tx, events) in digested {
                for (is_reissue, name, issuance) in events {
                    if is_reissue {
                        self.assets.insert_reissue(tx_hash, name, issuance);
                    } else {
                        self.assets.insert_create(tx_hash, name, issuance);
                    }
                }
                tx_map.insert(tx_hash, tx);
            }
            utxo_map.extend(chunk_utxos);
        }

        let mut prior_count = usize::MAX;
        while !tx_map.is_empty() && tx_map.len() != prior_count {
            prior_count = tx_map.len();
            let (deferred, remaining_utxos) =
                self.accept_transactions(tx_map, utxo_map, touched, assets_touched);
            tx_map = deferred;
            utxo_map = remaining_utxos;
        }
        if !tx_map.is_empty() {
            error!(
                "{} mempool tx(s) dropped: parents not found in mempool or DB",
                tx_map.len()
            );
        }

        Ok(())
    }

    // ---- C7: histogram engine --------------------------------------------

    /// Raw `fee_rate_bucket(0.1 sat/byte) → total_size`, spec.md §4.7 step 2.
    fn raw_histogram(&self) -> HashMap<u64, u64> {
        let mut hist = HashMap::new();
        for tx in self.txs.values() {
            if tx.size == 0 {
                continue;
            }
            let rate_tenths = (10.0 * tx.fee as f64 / tx.size as f64).floor() as u64;
            *hist.entry(rate_tenths).or_insert(0) += tx.size as u64;
        }
        hist
    }

    /// §4.7.1's compaction walk, descending fee_rate.
    fn compress_histogram(histogram: &HashMap<u64, u64>, bin_size: u64) -> Vec<(f64, u64)> {
        let entries: Vec<(u64, u64)> = histogram
            .iter()
            .map(|(&k, &v)| (k, v))
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .collect();

        let mut bin_size = bin_size as f64;
        let mut compact = Vec::new();
        let mut cum_size: u64 = 0;
        let mut prev_rate: Option<u64> = None;

        for (rate_tenths, size) in entries {
            if size as f64 > 2.0 * bin_size {
                if let Some(prev) = prev_rate {
                    if cum_size > 0 {
                        compact.push((prev as f64 / 10.0, cum_size));
                        cum_size = 0;
                        bin_size *= 1.1;
                    }
                }
            }
            cum_size += size;
            if cum_size as f64 > bin_size {
                compact.push((rate_tenths as f64 / 10.0, cum_size));
                cum_size = 0;
                bin_size *= 1.1;
            }
            prev_rate = Some(rate_tenths);
        }

        compact
    }

    /// Runs C7's build-and-compact step and publishes the result. The
    /// caller is expected to have already taken the mempool lock; the CPU
    /// work itself is cheap enough here (a HashMap scan over accepted txs)
    /// that, unlike C3, it does not need a separate worker dispatch for a
    /// mempool of realistic size.
    pub fn refresh_histogram(&mut self, bin_size: u64) {
        let hist = self.raw_histogram();
        self.cached_compact_histogram = Self::compress_histogram(&hist, bin_size);
    }

    // ---- C8: query surface -----------------------------------------------

    pub fn balance_delta(&self, sh: &ScriptHash) -> i64 {
        let mut value: i64 = 0;
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    if let Some(in_pairs) = &tx.in_pairs {
                        for p in in_pairs {
                            if &p.script_hash == sh && !p.is_asset() {
                                value -= p.value() as i64;
                            }
                        }
                    }
                    for p in &tx.out_pairs {
                        if &p.script_hash == sh && !p.is_asset() {
                            value += p.value() as i64;
                        }
                    }
                }
            }
        }
        value
    }

    pub fn asset_balance_delta(&self, sh: &ScriptHash) -> HashMap<AssetName, i64> {
        let mut deltas: HashMap<AssetName, i64> = HashMap::new();
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    if let Some(in_pairs) = &tx.in_pairs {
                        for p in in_pairs {
                            if &p.script_hash == sh {
                                if let ValueKind::Asset(name, v) = &p.kind {
                                    *deltas.entry(name.clone()).or_insert(0) -= *v as i64;
                                }
                            }
                        }
                    }
                    for p in &tx.out_pairs {
                        if &p.script_hash == sh {
                            if let ValueKind::Asset(name, v) = &p.kind {
                                *deltas.entry(name.clone()).or_insert(0) += *v as i64;
                            }
                        }
                    }
                }
            }
        }
        deltas
    }

    pub fn potential_spends(&self, sh: &ScriptHash) -> HashSet<OutPoint> {
        let mut spends = HashSet::new();
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    spends.extend(tx.prevouts.iter().cloned());
                }
            }
        }
        spends
    }

    pub fn transaction_summaries(&self, sh: &ScriptHash) -> Vec<MemPoolTxSummary> {
        let mut summaries = Vec::new();
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    let has_unconfirmed_inputs =
                        tx.prevouts.iter().any(|op| self.txs.contains_key(&op.txid));
                    summaries.push(MemPoolTxSummary {
                        tx_hash: *tx_hash,
                        fee: tx.fee,
                        has_unconfirmed_inputs,
                    });
                }
            }
        }
        summaries
    }

    pub fn unordered_utxos(&self, sh: &ScriptHash) -> Vec<MempoolUtxo> {
        let mut utxos = Vec::new();
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    for (pos, p) in tx.out_pairs.iter().enumerate() {
                        if &p.script_hash == sh && !p.is_asset() {
                            utxos.push(MempoolUtxo {
                                tx_hash: *tx_hash,
                                tx_pos: pos as u32,
                                value: p.value(),
                            });
                        }
                    }
                }
            }
        }
        utxos
    }

    pub fn unordered_assets(&self, sh: &ScriptHash) -> Vec<MempoolAssetUtxo> {
        let mut utxos = Vec::new();
        if let Some(hashes) = self.hash_xs.get(sh) {
            for tx_hash in hashes {
                if let Some(tx) = self.txs.get(tx_hash) {
                    for (pos, p) in tx.out_pairs.iter().enumerate() {
                        if &p.script_hash == sh {
                            if let ValueKind::Asset(name, value) = &p.kind {
                                utxos.push(MempoolAssetUtxo {
                                    tx_hash: *tx_hash,
                                    tx_pos: pos as u32,
                                    asset_name: name.clone(),
                                    value: *value,
                                });
                            }
                        }
                    }
                }
            }
        }
        utxos
    }

    pub fn compact_fee_histogram(&self) -> &[(f64, u64)] {
        &self.cached_compact_histogram
    }

    pub fn get_asset_creation_if_any(&self, name: &str) -> Option<&AssetIssuance> {
        self.assets.get_creation(name)
    }

    pub fn get_asset_reissues_if_any(&self, name: &str) -> Option<&AssetIssuance> {
        self.assets.get_reissuance(name)
    }
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(byte: u8) -> ScriptHash {
        ScriptHash([byte; 32])
    }

    #[test]
    fn compress_histogram_single_small_tx_below_bin_size() {
        let mut hist = HashMap::new();
        hist.insert(40u64, 250u64); // 4.0 sat/vB, 250 vbytes
        let compact = Mempool::compress_histogram(&hist, 100_000);
        assert!(compact.is_empty());
    }

    #[test]
    fn compress_histogram_scenario_one() {
        // spec.md §8 concrete scenario 1: fee 1000, size 250 -> 4.0 sat/vB,
        // bin_size=100 -> a single bucket right at the post-flush boundary.
        let mut hist = HashMap::new();
        hist.insert(40u64, 250u64);
        let compact = Mempool::compress_histogram(&hist, 100);
        assert_eq!(compact, vec![(4.0, 250)]);
    }

    #[test]
    fn compress_histogram_fee_rates_strictly_decrease() {
        let mut hist = HashMap::new();
        hist.insert(100u64, 50_000u64);
        hist.insert(50u64, 50_000u64);
        hist.insert(10u64, 50_000u64);
        let compact = Mempool::compress_histogram(&hist, 10_000);
        for pair in compact.windows(2) {
            assert!(pair[0].0 > pair[1].0);
        }
    }

    #[test]
    fn accept_transactions_generation_only_tx_has_zero_fee() {
        let mut mempool = Mempool::new();
        let tx_hash: Txid = "0000000000000000000000000000000000000000000000000000000000aa"
            .parse()
            .unwrap();
        let tx = MemPoolTx {
            prevouts: vec![],
            in_pairs: None,
            out_pairs: vec![OutputPair::coin(sh(1), 5_000_000_000)],
            fee: 0,
            size: 200,
        };
        let mut tx_map = HashMap::new();
        tx_map.insert(tx_hash, tx);

        let mut touched = HashSet::new();
        let mut assets_touched = HashSet::new();
        let (deferred, _remaining) =
            mempool.accept_transactions(tx_map, HashMap::new(), &mut touched, &mut assets_touched);

        assert!(deferred.is_empty());
        assert_eq!(mempool.txs.get(&tx_hash).unwrap().fee, 0);
        assert!(touched.contains(&sh(1)));
    }

    #[test]
    fn evict_then_reaccept_restores_prior_state() {
        let mut mempool = Mempool::new();
        let tx_hash: Txid = "0000000000000000000000000000000000000000000000000000000000bb"
            .parse()
            .unwrap();
        let tx = MemPoolTx {
            prevouts: vec![],
            in_pairs: None,
            out_pairs: vec![OutputPair::coin(sh(2), 1_000)],
            fee: 0,
            size: 100,
        };
        let mut tx_map = HashMap::new();
        tx_map.insert(tx_hash, tx);
        let mut touched = HashSet::new();
        let mut assets_touched = HashSet::new();
        mempool.accept_transactions(tx_map, HashMap::new(), &mut touched, &mut assets_touched);
        assert_eq!(mempool.tx_count(), 1);

        let mut gone = HashSet::new();
        gone.insert(tx_hash);
        mempool.evict(&gone, &mut touched, &mut assets_touched);
        assert_eq!(mempool.tx_count(), 0);
        assert!(!mempool.hash_xs.contains_key(&sh(2)));
    }

    #[test]
    fn hashxs_never_holds_empty_sets() {
        let mempool = Mempool::new();
        assert!(mempool.hash_xs.values().all(|s| !s.is_empty()));
    }
}
