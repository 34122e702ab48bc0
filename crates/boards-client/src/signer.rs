//! Amino signing
//!
//! The pipeline only depends on [`Signer`]; a wallet bridge or the in-process
//! [`LocalSigner`] can stand behind it.

use async_trait::async_trait;
use base64::Engine;
use boards_types::{Address, PubKey, SignDoc, StdSignature};
use k256::ecdsa::signature::Signer as EcdsaSigner;
use k256::ecdsa::{Signature, SigningKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public key type reported alongside amino signatures
pub const SIGNER_PUBKEY_TYPE: &str = "tendermint/PubKeySecp256k1";

#[derive(Error, Debug)]
pub enum SignerError {
    /// The key holder declined to sign
    #[error("signing rejected: {0}")]
    Rejected(String),

    #[error("signer unavailable: {0}")]
    Unavailable(String),

    #[error("signer holds {actual}, asked to sign for {expected}")]
    AddressMismatch { expected: String, actual: String },

    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// What a signer hands back: the document it actually signed and the
/// signature over it. Callers broadcast `signed`, not their own copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AminoSignResponse {
    pub signed: SignDoc,
    pub signature: StdSignature,
}

/// Signs amino sign-docs on behalf of an address
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_amino(
        &self,
        address: &str,
        sign_doc: &SignDoc,
    ) -> Result<AminoSignResponse, SignerError>;
}

/// Secp256k1 key held in memory
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let pubkey = key.verifying_key().to_encoded_point(true);
        let address = Address::from_pubkey(pubkey.as_bytes());
        Self { key, address }
    }

    /// Load a 32-byte private key given in hex, with or without `0x`
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let trimmed = private_key_hex.trim();
        let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let bytes = hex::decode(hex_str)
            .map_err(|e| SignerError::Encoding(format!("invalid hex private key: {e}")))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| SignerError::Encoding(format!("invalid secp256k1 key: {e}")))?;

        Ok(Self::new(key))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Compressed SEC1 public key, 33 bytes
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign_amino(
        &self,
        address: &str,
        sign_doc: &SignDoc,
    ) -> Result<AminoSignResponse, SignerError> {
        let own = self.address.to_string();
        if own != address {
            return Err(SignerError::AddressMismatch {
                expected: address.to_string(),
                actual: own,
            });
        }

        let bytes = sign_doc
            .sign_bytes()
            .map_err(|e| SignerError::Encoding(e.to_string()))?;

        // sha256 is applied by the signer; low-s form is required on chain
        let signature: Signature = self.key.sign(&bytes);
        let signature = signature.normalize_s().unwrap_or(signature);

        let engine = base64::engine::general_purpose::STANDARD;
        Ok(AminoSignResponse {
            signed: sign_doc.clone(),
            signature: StdSignature {
                pub_key: PubKey {
                    type_url: SIGNER_PUBKEY_TYPE.to_string(),
                    value: engine.encode(self.public_key_bytes()),
                },
                signature: engine.encode(signature.to_bytes()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boards_types::{AminoMsg, StdFee};
    use k256::ecdsa::signature::Verifier;
    use k256::ecdsa::VerifyingKey;

    const KEY_HEX: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn sample_doc() -> SignDoc {
        SignDoc {
            msgs: vec![AminoMsg {
                type_url: "/vm.m_call".to_string(),
                value: serde_json::json!({"func": "CreatePost"}),
            }],
            fee: StdFee {
                amount: vec![],
                gas: "2000000".to_string(),
            },
            chain_id: "dev".to_string(),
            memo: String::new(),
            account_number: "1".to_string(),
            sequence: "0".to_string(),
        }
    }

    #[test]
    fn test_from_hex() {
        let plain = LocalSigner::from_hex(KEY_HEX).unwrap();
        let prefixed = LocalSigner::from_hex(&format!("0x{KEY_HEX}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
        assert!(plain.address().to_string().starts_with("g1"));
        assert_eq!(plain.public_key_bytes().len(), 33);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(matches!(
            LocalSigner::from_hex("zz"),
            Err(SignerError::Encoding(_))
        ));
        assert!(matches!(
            LocalSigner::from_hex("00"),
            Err(SignerError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_amino_verifies() {
        let signer = LocalSigner::from_hex(KEY_HEX).unwrap();
        let doc = sample_doc();
        let address = signer.address().to_string();

        let response = signer.sign_amino(&address, &doc).await.unwrap();
        assert_eq!(response.signed, doc);
        assert_eq!(response.signature.pub_key.type_url, SIGNER_PUBKEY_TYPE);

        let engine = base64::engine::general_purpose::STANDARD;
        let sig_bytes = engine.decode(&response.signature.signature).unwrap();
        assert_eq!(sig_bytes.len(), 64);
        let pubkey = engine.decode(&response.signature.pub_key.value).unwrap();

        let verifying_key = VerifyingKey::from_sec1_bytes(&pubkey).unwrap();
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        assert!(signature.normalize_s().is_none());
        verifying_key
            .verify(&doc.sign_bytes().unwrap(), &signature)
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_amino_checks_address() {
        let signer = LocalSigner::from_hex(KEY_HEX).unwrap();
        let result = signer
            .sign_amino("g1jg8mtutu9khhfwc4nxmuhcpftf0pajdhfvsqf5", &sample_doc())
            .await;
        assert!(matches!(result, Err(SignerError::AddressMismatch { .. })));
    }
}
