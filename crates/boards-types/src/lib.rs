//! Core types for boards
//!
//! This crate provides the data structures shared by the transaction
//! pipeline: account addresses, the client configuration, realm call
//! messages and the amino sign-doc / std-tx shapes the chain accepts.

pub mod address;
pub mod config;
pub mod msgs;
pub mod tx;

pub use address::{Address, AddressError};
pub use config::{Config, ConfigError};
pub use msgs::{MsgCall, MsgError};
pub use tx::{
    AccountIdentity, AminoMsg, PubKey, SignDoc, StdFee, StdSignature, StdTx, TaggedMsg,
    TaggedPubKey, TxFee, TxSignature,
};
