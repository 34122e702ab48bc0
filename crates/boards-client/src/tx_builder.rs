//! Sign-doc assembly and std-tx encoding

use boards_math::Coin;
use boards_types::{
    AccountIdentity, Config, ConfigError, MsgCall, SignDoc, StdFee, StdSignature, StdTx,
    TaggedMsg, TaggedPubKey, TxFee, TxSignature,
};

/// Public key tag the node's decoder expects on every signature
pub const PUBKEY_SECP256K1_TYPE: &str = "/tm.PubKeySecp256k1";

/// Builds sign-docs for a fixed chain, gas limit and fee.
///
/// There is no gas estimation: every transaction carries the configured gas
/// limit and a single nominal fee coin.
#[derive(Debug, Clone, PartialEq)]
pub struct TxBuilder {
    /// Chain ID for the transaction
    pub chain_id: String,
    /// Gas limit for the transaction
    pub gas_limit: u64,
    /// Fee paid, always a single coin
    pub fee: Coin,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new(chain_id: impl Into<String>, gas_limit: u64, fee: Coin) -> Self {
        Self {
            chain_id: chain_id.into(),
            gas_limit,
            fee,
        }
    }

    /// Take chain id, gas limit and fee from the configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let amount = config.fees.amount.parse::<u128>().map_err(|e| {
            ConfigError::InvalidValue(format!("fee amount '{}': {e}", config.fees.amount))
        })?;
        let fee = Coin::new(config.chain.fee_denom.clone(), amount)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        Ok(Self::new(
            config.chain.id.clone(),
            config.gas.default_limit,
            fee,
        ))
    }

    /// Set gas limit
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Assemble the document to sign for a single message.
    ///
    /// `account` must be the identity fetched right before this call; the
    /// chain rejects any other sequence.
    pub fn build_sign_doc(&self, msg: &MsgCall, account: AccountIdentity) -> SignDoc {
        SignDoc {
            msgs: vec![msg.to_amino()],
            fee: StdFee {
                amount: vec![self.fee.clone()],
                gas: self.gas_limit.to_string(),
            },
            chain_id: self.chain_id.clone(),
            memo: String::new(),
            account_number: account.account_number.to_string(),
            sequence: account.sequence.to_string(),
        }
    }
}

/// Reshape a signed document into the broadcast envelope.
///
/// Only the first fee coin is carried; with none, `gas_fee` is empty and
/// the node's decoder reports it. Message values that are not objects carry
/// no fields besides their type.
pub fn encode_std_tx(signed: &SignDoc, signature: &StdSignature) -> StdTx {
    let msg = signed
        .msgs
        .iter()
        .map(|m| TaggedMsg {
            type_url: m.type_url.clone(),
            fields: m.value.as_object().cloned().unwrap_or_default(),
        })
        .collect();

    let gas_fee = signed
        .fee
        .amount
        .first()
        .map(Coin::to_string)
        .unwrap_or_default();

    StdTx {
        msg,
        fee: TxFee {
            gas_wanted: signed.fee.gas.clone(),
            gas_fee,
        },
        signatures: vec![TxSignature {
            pub_key: TaggedPubKey {
                type_url: PUBKEY_SECP256K1_TYPE.to_string(),
                value: signature.pub_key.value.clone(),
            },
            signature: signature.signature.clone(),
        }],
        memo: signed.memo.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boards_types::msgs::create_reply_msg;
    use boards_types::PubKey;
    use serde_json::json;

    const CALLER: &str = "g1jg8mtutu9khhfwc4nxmuhcpftf0pajdhfvsqf5";

    fn account() -> AccountIdentity {
        AccountIdentity {
            account_number: 12,
            sequence: 3,
        }
    }

    fn signature() -> StdSignature {
        StdSignature {
            pub_key: PubKey {
                type_url: "tendermint/PubKeySecp256k1".to_string(),
                value: "A+pubkey".to_string(),
            },
            signature: "c2ln".to_string(),
        }
    }

    #[test]
    fn test_from_config() {
        let builder = TxBuilder::from_config(&Config::default()).unwrap();
        assert_eq!(builder.chain_id, "dev");
        assert_eq!(builder.gas_limit, 2_000_000);
        assert_eq!(builder.fee, Coin::new("ugnot", 1).unwrap());
    }

    #[test]
    fn test_from_config_rejects_bad_fee() {
        let mut config = Config::default();
        config.fees.amount = "one".to_string();
        assert!(TxBuilder::from_config(&config).is_err());
    }

    #[test]
    fn test_build_sign_doc() {
        let builder = TxBuilder::from_config(&Config::default()).unwrap();
        let msg = create_reply_msg(CALLER, "gno.land/r/boards", 3, 7, 12, "hello").unwrap();
        let doc = builder.build_sign_doc(&msg, account());

        assert_eq!(doc.msgs.len(), 1);
        assert_eq!(doc.msgs[0].type_url, "/vm.m_call");
        assert_eq!(doc.fee.gas, "2000000");
        assert_eq!(doc.fee.amount, vec![Coin::new("ugnot", 1).unwrap()]);
        assert_eq!(doc.chain_id, "dev");
        assert_eq!(doc.memo, "");
        assert_eq!(doc.account_number, "12");
        assert_eq!(doc.sequence, "3");
    }

    #[test]
    fn test_build_sign_doc_is_deterministic() {
        let builder = TxBuilder::from_config(&Config::default())
            .unwrap()
            .gas_limit(100_000);
        let msg = create_reply_msg(CALLER, "gno.land/r/boards", 1, 2, 3, "again").unwrap();

        let first = builder.build_sign_doc(&msg, account());
        let second = builder.build_sign_doc(&msg, account());
        assert_eq!(first, second);
        assert_eq!(first.sign_bytes().unwrap(), second.sign_bytes().unwrap());
    }

    #[test]
    fn test_encode_std_tx() {
        let builder = TxBuilder::from_config(&Config::default()).unwrap();
        let msg = create_reply_msg(CALLER, "gno.land/r/boards", 3, 7, 12, "hello").unwrap();
        let doc = builder.build_sign_doc(&msg, account());

        let tx = encode_std_tx(&doc, &signature());
        assert_eq!(
            serde_json::to_value(&tx).unwrap(),
            json!({
                "msg": [{
                    "@type": "/vm.m_call",
                    "caller": CALLER,
                    "send": "",
                    "pkg_path": "gno.land/r/boards",
                    "func": "CreateReply",
                    "args": ["3", "7", "12", "hello"],
                }],
                "fee": {"gas_wanted": "2000000", "gas_fee": "1ugnot"},
                "signatures": [{
                    "pub_key": {"@type": "/tm.PubKeySecp256k1", "value": "A+pubkey"},
                    "signature": "c2ln",
                }],
                "memo": "",
            })
        );
    }

    #[test]
    fn test_encode_uses_first_fee_coin_only() {
        let builder = TxBuilder::from_config(&Config::default()).unwrap();
        let msg = create_reply_msg(CALLER, "gno.land/r/boards", 3, 7, 12, "hello").unwrap();
        let mut doc = builder.build_sign_doc(&msg, account());
        doc.fee.amount.push(Coin::new("ufoo", 99).unwrap());

        let tx = encode_std_tx(&doc, &signature());
        assert_eq!(tx.fee.gas_fee, "1ugnot");

        doc.fee.amount.clear();
        let tx = encode_std_tx(&doc, &signature());
        assert_eq!(tx.fee.gas_fee, "");
    }

    #[test]
    fn test_encode_retags_any_pubkey() {
        let builder = TxBuilder::from_config(&Config::default()).unwrap();
        let msg = create_reply_msg(CALLER, "gno.land/r/boards", 3, 7, 12, "hello").unwrap();
        let doc = builder.build_sign_doc(&msg, account());

        let mut sig = signature();
        sig.pub_key.type_url = "something/else".to_string();
        let tx = encode_std_tx(&doc, &sig);

        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(tx.signatures[0].pub_key.type_url, PUBKEY_SECP256K1_TYPE);
        assert_eq!(tx.signatures[0].pub_key.value, "A+pubkey");
    }
}
