//! Submission orchestration
//!
//! [`Submitter::submit`] runs one board action end to end: precondition
//! checks, account fetch, message and sign-doc assembly, signing, encoding
//! and broadcast. Each step is awaited in order and the first failure ends
//! the submission. Nothing is retried.

use crate::signer::{Signer, SignerError};
use crate::tx_builder::{encode_std_tx, TxBuilder};
use crate::{BroadcastResult, ChainClient, ClientError};
use async_trait::async_trait;
use boards_log::{debug, error, info};
use boards_types::msgs::{create_post_msg, create_reply_msg};
use boards_types::{Config, ConfigError, MsgCall, MsgError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A write to the boards realm
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardAction {
    CreatePost {
        bid: u64,
        title: String,
        body: String,
    },
    CreateReply {
        bid: u64,
        thread_id: u64,
        post_id: u64,
        body: String,
    },
}

impl BoardAction {
    /// Realm function the action calls
    pub fn func(&self) -> &'static str {
        match self {
            BoardAction::CreatePost { .. } => boards_types::msgs::CREATE_POST,
            BoardAction::CreateReply { .. } => boards_types::msgs::CREATE_REPLY,
        }
    }

    fn check(&self) -> Result<(), SubmitError> {
        let (bid, body) = match self {
            BoardAction::CreatePost { bid, title, body } => {
                if title.is_empty() {
                    return Err(SubmitError::Precondition("post title is empty".to_string()));
                }
                (*bid, body)
            }
            BoardAction::CreateReply { bid, body, .. } => (*bid, body),
        };

        if bid == 0 {
            return Err(SubmitError::Precondition("board id is missing".to_string()));
        }
        if body.is_empty() {
            return Err(SubmitError::Precondition("body is empty".to_string()));
        }
        Ok(())
    }

    fn to_msg(&self, caller: &str, pkg_path: &str) -> Result<MsgCall, MsgError> {
        match self {
            BoardAction::CreatePost { bid, title, body } => {
                create_post_msg(caller, pkg_path, *bid, title, body)
            }
            BoardAction::CreateReply {
                bid,
                thread_id,
                post_id,
                body,
            } => create_reply_msg(caller, pkg_path, *bid, *thread_id, *post_id, body),
        }
    }
}

/// Result of a committed submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    /// Transaction hash exactly as the node reported it
    pub hash: String,
    pub height: Option<u64>,
}

impl From<BroadcastResult> for TxOutcome {
    fn from(result: BroadcastResult) -> Self {
        Self {
            hash: result.hash,
            height: result.height,
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    /// Checked before any I/O
    #[error("cannot submit: {0}")]
    Precondition(String),

    #[error("failed to build message: {0}")]
    Message(#[from] MsgError),

    #[error("failed to fetch account: {0}")]
    AccountFetch(#[source] ClientError),

    #[error("failed to sign: {0}")]
    Signing(#[source] SignerError),

    #[error("failed to broadcast: {0}")]
    Broadcast(#[source] ClientError),
}

/// Hooks run after a successful broadcast
#[async_trait]
pub trait SubmissionObserver: Send + Sync {
    /// The caller's balance changed by at least the fee
    async fn refresh_balance(&self, _address: &str) {}

    /// The rendered board content is stale
    async fn reload_view(&self) {}
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

#[async_trait]
impl SubmissionObserver for NoopObserver {}

/// One async lock per caller address.
///
/// Entries nobody holds or waits on are dropped the next time a lock is
/// taken.
#[derive(Default)]
struct AddressLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AddressLocks {
    async fn acquire(&self, address: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(address.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Runs board actions against a chain
pub struct Submitter {
    chain: Arc<dyn ChainClient>,
    signer: Option<Arc<dyn Signer>>,
    observer: Arc<dyn SubmissionObserver>,
    tx_builder: TxBuilder,
    boards_path: String,
    locks: Option<AddressLocks>,
}

impl Submitter {
    /// Build a submitter with no signer and a no-op observer
    pub fn new(config: &Config, chain: Arc<dyn ChainClient>) -> Result<Self, ConfigError> {
        Ok(Self {
            chain,
            signer: None,
            observer: Arc::new(NoopObserver),
            tx_builder: TxBuilder::from_config(config)?,
            boards_path: config.realm.boards_path.clone(),
            locks: config
                .client
                .serialize_submissions
                .then(AddressLocks::default),
        })
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn boards_path(&self) -> &str {
        &self.boards_path
    }

    /// Submit `action` signed by `caller`.
    ///
    /// On success the observer gets exactly one balance refresh for the
    /// caller and one view reload. On failure it is not called.
    pub async fn submit(
        &self,
        caller: Option<&str>,
        action: &BoardAction,
    ) -> Result<TxOutcome, SubmitError> {
        let caller = caller
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SubmitError::Precondition("no caller address".to_string()))?;
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| SubmitError::Precondition("no signer available".to_string()))?;
        action.check()?;

        let result = self.run(caller, signer.as_ref(), action).await;
        match result {
            Ok(outcome) => {
                info!(
                    address = caller,
                    func = action.func(),
                    hash = %outcome.hash,
                    height = ?outcome.height,
                    "transaction committed"
                );
                self.observer.refresh_balance(caller).await;
                self.observer.reload_view().await;
                Ok(outcome)
            }
            Err(err) => {
                error!(address = caller, func = action.func(), error = %err, "submission failed");
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        caller: &str,
        signer: &dyn Signer,
        action: &BoardAction,
    ) -> Result<TxOutcome, SubmitError> {
        // held from account fetch through broadcast
        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(caller).await),
            None => None,
        };

        let account = self
            .chain
            .get_account(caller)
            .await
            .map_err(SubmitError::AccountFetch)?;
        debug!(
            address = caller,
            account_number = account.account_number,
            sequence = account.sequence,
            "fetched account"
        );

        let msg = action.to_msg(caller, &self.boards_path)?;
        let sign_doc = self.tx_builder.build_sign_doc(&msg, account);

        let response = signer
            .sign_amino(caller, &sign_doc)
            .await
            .map_err(SubmitError::Signing)?;
        debug!(address = caller, sequence = %response.signed.sequence, "signed");

        let tx = encode_std_tx(&response.signed, &response.signature);
        let result = self
            .chain
            .broadcast_tx(&tx)
            .await
            .map_err(SubmitError::Broadcast)?;

        Ok(result.into())
    }
}
