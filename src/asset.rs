//! C1 (script-template matcher) and C2 (asset-output parser), spec.md §4.1
//! and §4.2. Grounded in `electrumx.lib.script`'s `OPPushDataGeneric`/
//! `match_script_against_template` and `electrumx.lib.util.DataParser`
//! (`examples/original_source/electrumx/server/mempool.py`), translated to
//! the tagged-enum shape used by `crate::new_index::OutputPair`.

use crate::chain::Txid;
use crate::new_index::{
    is_valid_asset_name, AssetIssuance, AssetIssuanceSource, AssetName, OutputPair, ScriptHash,
};

/// Ravencoin's `OP_RVN_ASSET` marker opcode.
pub const OP_ASSET_TAG: u8 = 0xc0;
pub const OP_CHECKSIG: u8 = 0xac;

/// One opcode of a parsed script: its byte value, its pushed payload (if
/// it's a data-push op), and the exclusive end offset in the original
/// script. The end offset is what spec.md §4.2 step 2 needs to recover the
/// "pay-to-address prefix preceding the asset tag".
#[derive(Debug, Clone)]
pub struct ParsedOp {
    pub opcode: u8,
    pub data: Option<Vec<u8>>,
    pub end: usize,
}

/// Walks a script into its opcode sequence. Unlike `bitcoin::Script`'s
/// iterator, this keeps the byte offset each opcode ends at, which the
/// asset parser needs to re-slice the script. Malformed pushdata (a length
/// prefix that overruns the script) simply truncates the opcode list,
/// mirroring how a best-effort Script.get_ops walk stops early.
pub fn parse_ops(script: &[u8]) -> Vec<ParsedOp> {
    let mut ops = Vec::new();
    let mut i = 0usize;
    while i < script.len() {
        let opcode = script[i];
        i += 1;
        let data = match opcode {
            0x01..=0x4b => {
                let len = opcode as usize;
                if i + len > script.len() {
                    break;
                }
                let d = script[i..i + len].to_vec();
                i += len;
                Some(d)
            }
            0x4c => {
                // OP_PUSHDATA1
                if i >= script.len() {
                    break;
                }
                let len = script[i] as usize;
                i += 1;
                if i + len > script.len() {
                    break;
                }
                let d = script[i..i + len].to_vec();
                i += len;
                Some(d)
            }
            0x4d => {
                // OP_PUSHDATA2
                if i + 2 > script.len() {
                    break;
                }
                let len = u16::from_le_bytes([script[i], script[i + 1]]) as usize;
                i += 2;
                if i + len > script.len() {
                    break;
                }
                let d = script[i..i + len].to_vec();
                i += len;
                Some(d)
            }
            0x4e => {
                // OP_PUSHDATA4
                if i + 4 > script.len() {
                    break;
                }
                let len =
                    u32::from_le_bytes([script[i], script[i + 1], script[i + 2], script[i + 3]])
                        as usize;
                i += 4;
                if i + len > script.len() {
                    break;
                }
                let d = script[i..i + len].to_vec();
                i += len;
                Some(d)
            }
            _ => None,
        };
        ops.push(ParsedOp {
            opcode,
            data,
            end: i,
        });
    }
    ops
}

/// C1: a template item either pins a literal opcode or accepts any
/// data-push whose length satisfies a predicate (`OPPushDataGeneric`).
pub enum TemplateItem {
    Opcode(u8),
    PushData(fn(usize) -> bool),
}

/// Returns the number of opcodes consumed on a match, `None` otherwise —
/// spec.md §4.1's `-1`-on-mismatch translated to `Option`.
pub fn match_script_against_template(ops: &[ParsedOp], template: &[TemplateItem]) -> Option<usize> {
    if ops.len() < template.len() {
        return None;
    }
    for (op, item) in ops.iter().zip(template.iter()) {
        match item {
            TemplateItem::Opcode(code) => {
                if op.opcode != *code {
                    return None;
                }
            }
            TemplateItem::PushData(accepts_len) => match &op.data {
                Some(payload) if accepts_len(payload.len()) => {}
                _ => return None,
            },
        }
    }
    Some(template.len())
}

pub static P2PK_TEMPLATE: [TemplateItem; 2] = [
    TemplateItem::PushData(|len| len == 33 || len == 65),
    TemplateItem::Opcode(OP_CHECKSIG),
];

/// A cursor over an asset-data payload, mirroring `electrumx.lib.util.DataParser`.
struct PayloadCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

#[derive(Debug)]
pub struct PayloadTooShort;

impl<'a> PayloadCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        PayloadCursor { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PayloadTooShort> {
        if self.remaining() < n {
            return Err(PayloadTooShort);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, PayloadTooShort> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u64_le(&mut self) -> Result<u64, PayloadTooShort> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    /// Compact-size-prefixed byte string (the var-length-prefixed
    /// `asset_name` of spec.md §4.2 step 3).
    fn read_var_bytes(&mut self) -> Result<&'a [u8], PayloadTooShort> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }
}

/// The outcome of parsing one output script per spec.md §4.2: the output is
/// always represented, and it may additionally introduce or reissue an
/// asset.
pub enum AssetEvent {
    None,
    Create(AssetName, AssetIssuance),
    Reissue(AssetName, AssetIssuance),
}

pub struct ParsedOutput {
    pub pair: OutputPair,
    pub event: AssetEvent,
}

/// C2. `hash_script` is the chain-configuration collaborator
/// (`hashX_from_script`); it is applied either to the whole script or to
/// the prefix preceding the asset tag, per spec.md §4.2 step 2.
pub fn parse_output_script(
    script: &[u8],
    original_value: u64,
    tx_hash: Txid,
    vout: u32,
    hash_script: impl Fn(&[u8]) -> ScriptHash,
) -> ParsedOutput {
    let ops = parse_ops(script);

    let tag_index = ops.iter().position(|op| op.opcode == OP_ASSET_TAG);

    let tag_index = match tag_index {
        Some(k) => k,
        None => {
            return ParsedOutput {
                pair: OutputPair::coin(hash_script(script), original_value),
                event: AssetEvent::None,
            }
        }
    };

    let script_hash = if tag_index > 0 {
        let end_of_prev = ops[tag_index - 1].end;
        hash_script(&script[..end_of_prev])
    } else {
        hash_script(script)
    };

    if tag_index == 0 || tag_index >= ops.len() - 1 {
        // No asset-data push follows the tag; index as a plain spend.
        return ParsedOutput {
            pair: OutputPair::coin(script_hash, original_value),
            event: AssetEvent::None,
        };
    }

    let payload = match &ops[tag_index + 1].data {
        Some(d) => d,
        None => {
            return ParsedOutput {
                pair: OutputPair::coin(script_hash, original_value),
                event: AssetEvent::None,
            }
        }
    };

    match parse_asset_payload(payload, script_hash.clone(), original_value, tx_hash, vout) {
        Ok(parsed) => parsed,
        // Degrade-on-parse-error (spec.md §4.2 step 4 / §9): the output is
        // still represented, just as a plain native spend.
        Err(_) => ParsedOutput {
            pair: OutputPair::coin(script_hash, original_value),
            event: AssetEvent::None,
        },
    }
}

fn parse_asset_payload(
    payload: &[u8],
    script_hash: ScriptHash,
    original_value: u64,
    tx_hash: Txid,
    vout: u32,
) -> Result<ParsedOutput, PayloadTooShort> {
    let mut cur = PayloadCursor::new(payload);
    cur.read_bytes(3)?; // chain-specific asset-script header
    let asset_type = cur.read_u8()?;
    let asset_name_bytes = cur.read_var_bytes()?;
    let asset_name = String::from_utf8_lossy(asset_name_bytes).into_owned();
    if !is_valid_asset_name(&asset_name) {
        // Degrade the same way a too-short payload does (spec.md §4.2 step
        // 4 / §9): an asset tag with a malformed name is still indexed as
        // a plain spend, not as an asset output.
        return Err(PayloadTooShort);
    }

    let source = AssetIssuanceSource::mempool(tx_hash, vout);

    if asset_type == b'o' {
        let issuance = AssetIssuance {
            sats_in_circulation: 100_000_000,
            divisions: 0,
            reissuable: false,
            has_ipfs: false,
            ipfs: None,
            source,
        };
        return Ok(ParsedOutput {
            pair: OutputPair::asset(script_hash, asset_name.clone(), 100_000_000),
            event: AssetEvent::Create(asset_name, issuance),
        });
    }

    let value = cur.read_u64_le()?;
    let pair = OutputPair::asset(script_hash, asset_name.clone(), value);

    let event = match asset_type {
        b'q' => {
            let divisions = cur.read_u8()?;
            let reissuable = cur.read_u8()? != 0;
            let has_meta = cur.read_u8()?;
            let ipfs = if has_meta != 0 {
                Some(bs58::encode(cur.read_bytes(34)?).into_string())
            } else {
                None
            };
            AssetEvent::Create(
                asset_name,
                AssetIssuance {
                    sats_in_circulation: value,
                    divisions,
                    reissuable,
                    has_ipfs: ipfs.is_some(),
                    ipfs,
                    source,
                },
            )
        }
        b'r' => {
            let divisions = cur.read_u8()?;
            let reissuable = cur.read_u8()? != 0;
            let ipfs = if cur.remaining() >= 34 {
                Some(bs58::encode(cur.read_bytes(34)?).into_string())
            } else {
                None
            };
            AssetEvent::Reissue(
                asset_name,
                AssetIssuance {
                    sats_in_circulation: value,
                    divisions,
                    reissuable,
                    has_ipfs: ipfs.is_some(),
                    ipfs,
                    source,
                },
            )
        }
        // Any other asset_type (e.g. a plain transfer 't') still indexes as
        // an asset output; no metadata is recorded. Spec.md §9 open
        // question: treated as specified behavior.
        _ => AssetEvent::None,
    };

    let _ = original_value; // the asset branch never falls back to the coin value
    Ok(ParsedOutput { pair, event })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(byte: u8) -> ScriptHash {
        ScriptHash([byte; 32])
    }

    fn txid() -> Txid {
        "0000000000000000000000000000000000000000000000000000000000aa"
            .parse()
            .unwrap()
    }

    /// Builds an asset-data payload: 3-byte chain header, asset_type byte,
    /// compact-size-prefixed name, then whatever the caller appends.
    fn payload(asset_type: u8, name: &str, rest: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; 3];
        out.push(asset_type);
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(rest);
        out
    }

    /// Wraps a payload in an `OP_RVN_ASSET <payload>` script, matching how
    /// `parse_output_script` expects to find it after the tag opcode.
    fn asset_script(payload: &[u8]) -> Vec<u8> {
        let mut script = vec![OP_ASSET_TAG];
        assert!(payload.len() <= 0x4b);
        script.push(payload.len() as u8);
        script.extend_from_slice(payload);
        script
    }

    #[test]
    fn parse_ops_walks_pushdata_and_plain_opcodes() {
        let script = vec![0x02, 0xaa, 0xbb, OP_CHECKSIG];
        let ops = parse_ops(&script);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].data, Some(vec![0xaa, 0xbb]));
        assert_eq!(ops[0].end, 3);
        assert_eq!(ops[1].opcode, OP_CHECKSIG);
        assert_eq!(ops[1].data, None);
    }

    #[test]
    fn parse_ops_truncates_on_overrunning_pushdata_length() {
        let script = vec![0x09, 0xaa, 0xbb]; // claims 9 bytes, only 2 follow
        let ops = parse_ops(&script);
        assert!(ops.is_empty());
    }

    #[test]
    fn match_template_accepts_p2pk_pubkey_lengths() {
        let script = {
            let mut s = vec![0x21]; // 33-byte push
            s.extend(vec![0x02; 33]);
            s.push(OP_CHECKSIG);
            s
        };
        let ops = parse_ops(&script);
        assert_eq!(
            match_script_against_template(&ops, &P2PK_TEMPLATE),
            Some(2)
        );
    }

    #[test]
    fn match_template_rejects_wrong_pubkey_length() {
        let script = {
            let mut s = vec![0x14]; // 20 bytes, not a valid pubkey length
            s.extend(vec![0x02; 20]);
            s.push(OP_CHECKSIG);
            s
        };
        let ops = parse_ops(&script);
        assert_eq!(match_script_against_template(&ops, &P2PK_TEMPLATE), None);
    }

    #[test]
    fn q_type_issuance_matches_scenario_three() {
        // spec.md §8 scenario 3: name "FOO", value 500, divisions 2,
        // reissuable=1, has_meta=0.
        let mut rest = 500u64.to_le_bytes().to_vec();
        rest.push(2); // divisions
        rest.push(1); // reissuable
        rest.push(0); // has_meta
        let script = asset_script(&payload(b'q', "FOO", &rest));

        let out = parse_output_script(&script, 0, txid(), 0, |s| sh(s.len() as u8));

        assert!(out.pair.is_asset());
        assert_eq!(out.pair.asset_name(), Some("FOO"));
        assert_eq!(out.pair.value(), 500);
        match out.event {
            AssetEvent::Create(name, issuance) => {
                assert_eq!(name, "FOO");
                assert_eq!(issuance.sats_in_circulation, 500);
                assert_eq!(issuance.divisions, 2);
                assert!(issuance.reissuable);
                assert!(!issuance.has_ipfs);
                assert_eq!(issuance.source.height, AssetIssuanceSource::MEMPOOL_HEIGHT);
            }
            _ => panic!("expected a Create event"),
        }
    }

    #[test]
    fn owner_token_issuance_matches_scenario_four() {
        // spec.md §8 scenario 4: owner token type 'o', name "FOO!", fixed
        // 100_000_000 sat circulation.
        let script = asset_script(&payload(b'o', "FOO!", &[]));

        let out = parse_output_script(&script, 0, txid(), 0, |s| sh(s.len() as u8));

        assert!(out.pair.is_asset());
        assert_eq!(out.pair.asset_name(), Some("FOO!"));
        assert_eq!(out.pair.value(), 100_000_000);
        match out.event {
            AssetEvent::Create(name, issuance) => {
                assert_eq!(name, "FOO!");
                assert_eq!(issuance.sats_in_circulation, 100_000_000);
            }
            _ => panic!("expected a Create event"),
        }
    }

    #[test]
    fn reissue_payload_produces_reissue_event() {
        let mut rest = 750u64.to_le_bytes().to_vec();
        rest.push(0); // divisions
        rest.push(0); // reissuable
        let script = asset_script(&payload(b'r', "FOO", &rest));

        let out = parse_output_script(&script, 0, txid(), 0, |s| sh(s.len() as u8));

        assert!(out.pair.is_asset());
        match out.event {
            AssetEvent::Reissue(name, issuance) => {
                assert_eq!(name, "FOO");
                assert_eq!(issuance.sats_in_circulation, 750);
                assert!(!issuance.reissuable);
            }
            _ => panic!("expected a Reissue event"),
        }
    }

    #[test]
    fn truncated_asset_payload_degrades_to_plain_spend() {
        // spec.md §8 scenario 5: a parse exception mid-payload degrades the
        // output to a plain native spend, no asset_creates entry.
        let script = asset_script(&payload(b'q', "FOO", &[0xaa])); // missing fields
        let out = parse_output_script(&script, 12_345, txid(), 0, |s| sh(s.len() as u8));

        assert!(!out.pair.is_asset());
        assert_eq!(out.pair.value(), 12_345);
        assert!(matches!(out.event, AssetEvent::None));
    }

    #[test]
    fn invalid_asset_name_degrades_to_plain_spend() {
        // A name failing `is_valid_asset_name` (empty, too long, or
        // non-ASCII) must degrade exactly like a truncated payload.
        let long_name = "x".repeat(64);
        let script = asset_script(&payload(b'o', &long_name, &[]));
        let out = parse_output_script(&script, 777, txid(), 0, |s| sh(s.len() as u8));

        assert!(!out.pair.is_asset());
        assert_eq!(out.pair.value(), 777);
        assert!(matches!(out.event, AssetEvent::None));
    }

    #[test]
    fn script_without_asset_tag_is_a_plain_coin_output() {
        let script = vec![OP_CHECKSIG];
        let out = parse_output_script(&script, 999, txid(), 0, |s| sh(s.len() as u8));

        assert!(!out.pair.is_asset());
        assert_eq!(out.pair.value(), 999);
        assert!(matches!(out.event, AssetEvent::None));
    }
}
