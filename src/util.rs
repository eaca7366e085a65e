use bitcoin::Txid;

pub type Bytes = Vec<u8>;

/// The fixed-width chain-defined script hash used as the unit of
/// light-client subscription. Computing one from a script is a
/// chain-configuration collaborator (`ChainConfig::hash_x_from_script`);
/// this type only names the shape of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptHash(pub [u8; 32]);

impl ScriptHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::DisplayHex::to_lower_hex_string(&self.0.as_slice()))
    }
}

/// Split a slice into fixed-size chunks, dropping no elements (the final
/// chunk may be shorter). Mirrors `electrumx.lib.util.chunks`, used to batch
/// new mempool hashes into bounded-size fetch groups (spec.md 4.6 step 5).
pub fn chunks<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0);
    items.chunks(size).map(|c| c.to_vec()).collect()
}

pub fn hash_to_hex_str(hash: &Txid) -> String {
    format!("{:x}", hash)
}

pub fn hex_str_to_txid(s: &str) -> crate::errors::Result<Txid> {
    use std::str::FromStr;
    Txid::from_str(s).map_err(|e| format!("invalid txid {}: {}", s, e).into())
}
