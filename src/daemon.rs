//! Minimal JSON-RPC client for the node. Out of scope for the mempool core
//! per spec.md 1 ("the node RPC client... treated as an external
//! collaborator"); kept here only so `RpcMempoolApi` (src/new_index/api.rs)
//! has something real to wrap and the harness binary is runnable end to end.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::Engine;
use hex::FromHex;
use serde_json::Value;

use crate::config::Config;
use crate::errors::*;

pub struct Daemon {
    addr: String,
    auth: Option<String>,
    next_id: AtomicUsize,
}

impl Daemon {
    pub fn new(config: &Config) -> Result<Daemon> {
        let auth = match (&config.daemon_rpc_user, &config.daemon_rpc_pass) {
            (Some(user), Some(pass)) => Some(basic_auth(user, pass)),
            _ => config
                .daemon_cookie_file
                .as_ref()
                .map(read_cookie)
                .transpose()?,
        };
        Ok(Daemon {
            addr: config.daemon_rpc_addr.clone(),
            auth,
            next_id: AtomicUsize::new(0),
        })
    }

    /// Sends one JSON-RPC request and returns the raw decoded response,
    /// `error` field and all — transport/auth/parse failures are the only
    /// things that become an `Err` here, so callers can still distinguish a
    /// well-formed RPC-level error (e.g. "tx not found") from a genuine
    /// collaborator failure (spec.md §7).
    fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let body = serde_json::to_vec(&request).chain_err(|| "failed to encode RPC request")?;

        let mut stream = TcpStream::connect(&self.addr)
            .chain_err(|| format!("failed to connect to daemon at {}", self.addr))?;

        let mut head = format!(
            "POST / HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
            self.addr,
            body.len()
        );
        if let Some(auth) = &self.auth {
            head.push_str(&format!("Authorization: Basic {}\r\n", auth));
        }
        head.push_str("Connection: close\r\n\r\n");

        stream
            .write_all(head.as_bytes())
            .chain_err(|| "failed writing RPC request head")?;
        stream
            .write_all(&body)
            .chain_err(|| "failed writing RPC request body")?;

        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader
                .read_line(&mut line)
                .chain_err(|| "failed reading RPC response headers")?;
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Content-Length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut payload = vec![0u8; content_length];
        reader
            .read_exact(&mut payload)
            .chain_err(|| "failed reading RPC response body")?;

        serde_json::from_slice(&payload).chain_err(|| "failed to parse RPC response".into())
    }

    /// `request`, plus the usual "any non-null `error` field is fatal"
    /// check used by every RPC except `getrawtransaction` (which needs to
    /// tell "not found" apart from a real failure).
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let response = self.request(method, params)?;
        if let Some(err) = response.get("error") {
            if !err.is_null() {
                bail!(ErrorKind::Daemon(format!("{}: {}", method, err)));
            }
        }
        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    pub fn getblockcount(&self) -> Result<u32> {
        let result = self.call("getblockcount", Value::Array(vec![]))?;
        result
            .as_u64()
            .map(|n| n as u32)
            .ok_or_else(|| "getblockcount: bad response".into())
    }

    pub fn getrawmempool(&self) -> Result<Vec<String>> {
        let result = self.call("getrawmempool", Value::Array(vec![]))?;
        let arr = result
            .as_array()
            .ok_or("getrawmempool: expected array")?;
        Ok(arr
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect())
    }

    /// bitcoind-family RPC error code for "No such mempool or blockchain
    /// transaction".
    const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

    /// `None` means the node reports the tx as genuinely gone (evicted
    /// between the hash listing and this fetch, spec.md §4.4/§7 "raw-tx
    /// evicted at fetch time") — only `RPC_INVALID_ADDRESS_OR_KEY` is folded
    /// into that case. Any other RPC error, or a transport/auth failure,
    /// propagates as a collaborator failure per spec.md §7.
    pub fn getrawtransaction(&self, txid_hex: &str) -> Result<Option<Vec<u8>>> {
        let params = serde_json::json!([txid_hex, 0]);
        let response = self.request("getrawtransaction", params)?;

        if let Some(err) = response.get("error") {
            if !err.is_null() {
                if err.get("code").and_then(Value::as_i64) == Some(Self::RPC_INVALID_ADDRESS_OR_KEY)
                {
                    return Ok(None);
                }
                bail!(ErrorKind::Daemon(format!("getrawtransaction: {}", err)));
            }
        }

        match response.get("result") {
            Some(Value::String(hex)) => Ok(Some(
                Vec::<u8>::from_hex(hex).chain_err(|| "invalid raw tx hex")?,
            )),
            _ => Ok(None),
        }
    }
}

fn basic_auth(user: &str, pass: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, pass))
}

fn read_cookie(path: &std::path::PathBuf) -> Result<String> {
    let contents =
        std::fs::read_to_string(path).chain_err(|| "failed to read daemon cookie file")?;
    Ok(base64::engine::general_purpose::STANDARD.encode(contents.trim()))
}

pub type SharedDaemon = Arc<Daemon>;
