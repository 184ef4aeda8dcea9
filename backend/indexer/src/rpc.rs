//! Soroban RPC client: polls `getEvents` and decodes PensionFund events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, FundEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Invalid request / unknown method: retrying cannot help.
    fn is_fatal(&self) -> bool {
        self.code == -32600 || self.code == -32601
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

/// One entry of `getEvents` requested with `xdrFormat: "json"`: topics and
/// body arrive as JSON-encoded `ScVal`s instead of base64 XDR.
#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(rename = "topicJson", default)]
    pub topic: Vec<Value>,
    #[serde(rename = "valueJson", default)]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    /// Older RPC releases only; equal to `id`.
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events for `contract_id`.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive); ignored
///   when `cursor` is given.
/// * `cursor`: opaque pagination cursor from a previous page.
/// * `limit`: maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if err.is_fatal() {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`FundEvent`]s.
///
/// Events from failed contract calls are dropped: the ledger rolled them back.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<FundEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<FundEvent> {
    let Some(event_id) = raw.id.clone().or_else(|| raw.paging_token.clone()) else {
        warn!("Skipping event without id at ledger {:?}", raw.ledger);
        return None;
    };
    let kind = EventKind::from_topic(&scval_to_string(raw.topic.first()?)?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let topic_participant = raw.topic.get(1).and_then(scval_to_string);
    let (participant, amount, stablecoin_percentage) = match kind {
        EventKind::FundInitialized => (
            extract_field(&raw.value, "owner"),
            extract_field(&raw.value, "minimum_investment"),
            None,
        ),
        EventKind::InvestmentCreated => (
            extract_field(&raw.value, "participant").or(topic_participant),
            extract_field(&raw.value, "amount"),
            extract_field(&raw.value, "stablecoin_percentage").and_then(|p| p.parse().ok()),
        ),
        EventKind::InvestmentWithdrawn => (
            extract_field(&raw.value, "participant").or(topic_participant),
            extract_field(&raw.value, "amount"),
            None,
        ),
        EventKind::Unknown => (topic_participant, None, None),
    };

    Some(FundEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        participant,
        amount,
        stablecoin_percentage,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Look up `key` in a `#[contracttype]` struct body, which the RPC renders as
/// `{"map":[{"key":{"symbol":…},"val":…}, …]}`.
fn extract_field(body: &Value, key: &str) -> Option<String> {
    body.get("map")?
        .as_array()?
        .iter()
        .find(|entry| {
            entry
                .get("key")
                .and_then(scval_to_string)
                .is_some_and(|k| k == key)
        })
        .and_then(|entry| entry.get("val"))
        .and_then(scval_to_string)
}

/// Render a scalar JSON `ScVal` (`{"symbol":"invested"}`, `{"u32":60}`,
/// `{"i128":"1000"}`, ...) as a string. Composite values yield `None`.
fn scval_to_string(v: &Value) -> Option<String> {
    let (ty, inner) = v.as_object()?.iter().next()?;
    match ty.as_str() {
        "symbol" | "string" | "address" => inner.as_str().map(String::from),
        "u32" | "i32" | "u64" | "i64" | "timepoint" | "duration" => scalar(inner),
        "i128" | "u128" => scalar(inner).or_else(|| i128_parts(inner)),
        _ => None,
    }
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 128-bit integers from older XDR JSON encoders: `{"hi":…,"lo":…}`.
fn i128_parts(v: &Value) -> Option<String> {
    let hi = v.get("hi")?.as_i64()?;
    let lo = v.get("lo")?.as_u64()?;
    Some(((i128::from(hi) << 64) | i128::from(lo)).to_string())
}

/// Parse an RFC 3339 timestamp into Unix seconds.
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
