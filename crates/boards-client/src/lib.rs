//! Client library for posting to the boards realm.
//!
//! This crate holds the transaction pipeline (sign-doc assembly, signing,
//! std-tx encoding, submission) together with the JSON-RPC node client it
//! runs against and the command-line definitions of the `boards` binary.

pub mod cli;
pub mod signer;
pub mod submit;
pub mod tx_builder;

pub use signer::{AminoSignResponse, LocalSigner, Signer, SignerError};
pub use submit::{
    BoardAction, NoopObserver, SubmissionObserver, SubmitError, Submitter, TxOutcome,
};
pub use tx_builder::{encode_std_tx, TxBuilder, PUBKEY_SECP256K1_TYPE};

use async_trait::async_trait;
use base64::Engine;
use boards_log::debug;
use boards_math::{parse_coins, Coin};
use boards_types::{AccountIdentity, StdTx};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("json parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// RPC error
    #[error("rpc error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The node answered the query with an application error
    #[error("query {path} failed: {message}")]
    Query { path: String, message: String },

    /// The node rejected the transaction
    #[error("transaction rejected: {0}")]
    TxRejected(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Outcome of a committed broadcast
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub hash: String,
    pub height: Option<u64>,
}

/// Operations the pipeline needs from a chain node
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current account number and sequence of `address`
    async fn get_account(&self, address: &str) -> Result<AccountIdentity>;

    /// Rendered content of a realm path
    async fn render(&self, pkg_path: &str, path: &str) -> Result<String>;

    /// Broadcast a signed transaction and wait for it to be committed
    async fn broadcast_tx(&self, tx: &StdTx) -> Result<BroadcastResult>;

    /// Balances held by `address`
    async fn query_balances(&self, address: &str) -> Result<Vec<Coin>>;
}

/// RPC request
#[derive(Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Value,
}

/// RPC response
#[derive(Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: Value,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

/// RPC error
#[derive(Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// Application response shared by queries and tx results
#[derive(Deserialize, Default, Debug)]
struct ResponseBase {
    #[serde(rename = "Error", default)]
    error: Option<Value>,
    #[serde(rename = "Data", default)]
    data: Option<String>,
    #[serde(rename = "Log", default)]
    log: String,
}

impl ResponseBase {
    /// Describe the application error, if any
    fn failure(&self) -> Option<String> {
        let error = self.error.as_ref().filter(|e| !e.is_null())?;
        let kind = error
            .get("@type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        Some(if self.log.is_empty() {
            kind
        } else {
            format!("{kind}: {}", self.log)
        })
    }

    fn data_bytes(&self) -> Result<Vec<u8>> {
        match &self.data {
            Some(data) => base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| ClientError::InvalidResponse(format!("invalid base64 data: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct AbciQueryResult {
    response: AbciResponse,
}

#[derive(Deserialize, Debug)]
struct AbciResponse {
    #[serde(rename = "ResponseBase")]
    base: ResponseBase,
}

#[derive(Deserialize, Debug)]
struct TxResponse {
    #[serde(rename = "ResponseBase", default)]
    base: ResponseBase,
}

#[derive(Deserialize, Debug)]
struct BroadcastCommitResult {
    check_tx: TxResponse,
    deliver_tx: TxResponse,
    hash: String,
    #[serde(default)]
    height: Option<Value>,
}

/// Connection settings for [`Client`]
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Node URL
    pub node_url: Url,
    /// Request timeout
    pub timeout: Duration,
}

impl NodeConfig {
    /// Create a new configuration
    pub fn new(node_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            node_url: Url::parse(node_url)?,
            timeout,
        })
    }

    pub fn from_config(config: &boards_types::Config) -> Result<Self> {
        Self::new(&config.client.node_url, config.client_timeout())
    }
}

/// JSON-RPC client for a chain node
pub struct Client {
    config: NodeConfig,
    http_client: HttpClient,
}

impl Client {
    /// Create a new client
    pub fn new(config: NodeConfig) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Make an RPC request
    async fn rpc_request<T>(&self, method: &str, params: Value) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: "1".to_string(),
            method: method.to_string(),
            params,
        };

        debug!(method, url = %self.config.node_url, "rpc request");

        let response = self
            .http_client
            .post(self.config.node_url.clone())
            .json(&request)
            .send()
            .await?;

        let rpc_response: RpcResponse<T> = response.json().await?;

        if let Some(error) = rpc_response.error {
            let message = match error.data {
                Some(data) if !data.is_empty() => format!("{} ({data})", error.message),
                _ => error.message,
            };
            return Err(ClientError::Rpc {
                code: error.code,
                message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| ClientError::InvalidResponse("missing result field".to_string()))
    }

    /// Query the application and return the raw response data
    pub async fn abci_query(&self, path: &str, data: &[u8]) -> Result<Vec<u8>> {
        let params = serde_json::json!({
            "path": path,
            "data": base64::engine::general_purpose::STANDARD.encode(data),
        });

        let result: AbciQueryResult = self.rpc_request("abci_query", params).await?;
        if let Some(message) = result.response.base.failure() {
            return Err(ClientError::Query {
                path: path.to_string(),
                message,
            });
        }

        result.response.base.data_bytes()
    }
}

#[async_trait]
impl ChainClient for Client {
    async fn get_account(&self, address: &str) -> Result<AccountIdentity> {
        let data = self
            .abci_query(&format!("auth/accounts/{address}"), &[])
            .await?;
        parse_account(&data, address)
    }

    async fn render(&self, pkg_path: &str, path: &str) -> Result<String> {
        let query = format!("{pkg_path}\n{path}");
        let data = self.abci_query("vm/qrender", query.as_bytes()).await?;
        String::from_utf8(data)
            .map_err(|e| ClientError::InvalidResponse(format!("render output is not utf-8: {e}")))
    }

    async fn broadcast_tx(&self, tx: &StdTx) -> Result<BroadcastResult> {
        let tx_bytes = serde_json::to_vec(tx)?;
        let params = serde_json::json!({
            "tx": base64::engine::general_purpose::STANDARD.encode(tx_bytes),
        });

        let result: BroadcastCommitResult = self.rpc_request("broadcast_tx_commit", params).await?;
        broadcast_outcome(result)
    }

    async fn query_balances(&self, address: &str) -> Result<Vec<Coin>> {
        let data = self
            .abci_query(&format!("bank/balances/{address}"), &[])
            .await?;
        parse_balances(&data)
    }
}

/// Read a number the node may encode either as a JSON number or a string
fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(lenient_u64)
}

fn parse_account(data: &[u8], address: &str) -> Result<AccountIdentity> {
    let value: Value = serde_json::from_slice(data)?;
    let account = value
        .get("BaseAccount")
        .ok_or_else(|| ClientError::InvalidResponse(format!("account not found: {address}")))?;

    let account_number = u64_field(account, "account_number").ok_or_else(|| {
        ClientError::InvalidResponse(format!("missing account_number for {address}"))
    })?;
    let sequence = u64_field(account, "sequence")
        .ok_or_else(|| ClientError::InvalidResponse(format!("missing sequence for {address}")))?;

    Ok(AccountIdentity {
        account_number,
        sequence,
    })
}

fn parse_balances(data: &[u8]) -> Result<Vec<Coin>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let coins: String = serde_json::from_slice(data)?;
    parse_coins(&coins).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

fn broadcast_outcome(result: BroadcastCommitResult) -> Result<BroadcastResult> {
    if let Some(message) = result.check_tx.base.failure() {
        return Err(ClientError::TxRejected(message));
    }
    if let Some(message) = result.deliver_tx.base.failure() {
        return Err(ClientError::TxRejected(message));
    }

    let height = result.height.as_ref().and_then(lenient_u64);

    Ok(BroadcastResult {
        hash: result.hash,
        height,
    })
}
