//! Thin re-exports over the chain-specific `bitcoin` fork. Kept separate
//! from the rest of the crate so that a future chain swap only touches this
//! file, matching how `electrs` isolates `bitcoin`/`elements` behind
//! `crate::chain`.

pub use bitcoin::blockdata::script::{Instruction, Script};
pub use bitcoin::consensus::encode::deserialize;
pub use bitcoin::{Network, OutPoint, Transaction, TxIn, TxOut, Txid};

use crate::errors::*;

/// A transaction input with no real prevout (coinbase/generation). Dropped
/// from `MemPoolTx::prevouts` per spec.md's glossary entry for
/// "generation-like input".
pub fn is_generation(txin: &TxIn) -> bool {
    txin.previous_output.is_null()
}

pub fn has_prevout(txin: &TxIn) -> bool {
    !is_generation(txin)
}

/// Deserialize a raw transaction and report its virtual size, mirroring the
/// original's `read_tx(raw, 0) -> (tx, size, wit_hash)` (spec.md 4.3 step 1).
/// The witness hash is not needed by this core (it is used upstream for
/// wtxid-based relay dedup) and is omitted.
pub fn read_tx(raw: &[u8]) -> Result<(Transaction, u32)> {
    let tx: Transaction = deserialize(raw).chain_err(|| "failed to deserialize transaction")?;
    let vsize = tx.get_weight().div_ceil(4) as u32;
    Ok((tx, vsize))
}
