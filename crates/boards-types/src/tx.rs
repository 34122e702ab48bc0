//! Amino transaction types
//!
//! Two shapes live here. [`SignDoc`] is the order-fixed document a signer
//! signs over, in the amino JSON layout wallets expect. [`StdTx`] is the
//! envelope the node's broadcast endpoint decodes, with every message and
//! public key tagged by an `@type` discriminator.

use boards_math::Coin;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account state the chain reports immediately before signing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub account_number: u64,
    pub sequence: u64,
}

/// A message in `{type, value}` form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub type_url: String,
    pub value: Value,
}

/// Fee as it appears in a sign-doc
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    /// Gas limit, a decimal string
    pub gas: String,
}

/// The document signed by the wallet. Field order is part of the format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignDoc {
    pub msgs: Vec<AminoMsg>,
    pub fee: StdFee,
    pub chain_id: String,
    pub memo: String,
    pub account_number: String,
    pub sequence: String,
}

impl SignDoc {
    /// Canonical bytes to sign: compact JSON with object keys sorted at
    /// every level.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let value = sort_keys(serde_json::to_value(self)?);
        serde_json::to_vec(&value)
    }
}

/// Rebuild objects with sorted keys, independent of how `serde_json`
/// orders its maps.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Public key as returned by a signer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    #[serde(rename = "type")]
    pub type_url: String,
    /// Base64 of the compressed key bytes
    pub value: String,
}

/// Signature as returned by a signer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: PubKey,
    /// Base64 of the signature bytes
    pub signature: String,
}

/// Message with its type merged into the payload fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaggedMsg {
    #[serde(rename = "@type")]
    pub type_url: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Fee as the broadcast endpoint expects it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFee {
    pub gas_wanted: String,
    /// `<amount><denom>` of a single coin
    pub gas_fee: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPubKey {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub pub_key: TaggedPubKey,
    pub signature: String,
}

/// Signed transaction envelope handed to the broadcast endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<TaggedMsg>,
    pub fee: TxFee,
    pub signatures: Vec<TxSignature>,
    pub memo: String,
}
