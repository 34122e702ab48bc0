//! VM module message types

use crate::tx::AminoMsg;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amino type of a realm function call
pub const MSG_CALL_TYPE: &str = "/vm.m_call";

/// Boards realm function creating a thread
pub const CREATE_POST: &str = "CreatePost";

/// Boards realm function replying inside a thread
pub const CREATE_REPLY: &str = "CreateReply";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MsgError {
    #[error("message caller is empty")]
    MissingCaller,
}

/// MsgCall invokes an exported function of a realm.
///
/// Arguments are positional and always strings on the wire, whatever their
/// type in the realm; the chain converts them when the call executes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCall {
    /// Signing account
    pub caller: String,
    /// Funds sent along with the call, `<amount><denom>` or empty
    pub send: String,
    /// Realm package path, e.g. `gno.land/r/boards`
    pub pkg_path: String,
    /// Exported function name
    pub func: String,
    pub args: Vec<String>,
}

impl MsgCall {
    /// Wrap into the `{type, value}` form used inside sign-docs
    pub fn to_amino(&self) -> AminoMsg {
        AminoMsg {
            type_url: MSG_CALL_TYPE.to_string(),
            // a struct of strings always serializes
            value: serde_json::to_value(self).unwrap_or_default(),
        }
    }
}

/// Build a call message for `func` on the realm at `pkg_path`.
///
/// The argument count is not checked against the realm function; that
/// happens on chain.
pub fn build_call_message<I, A>(
    caller: &str,
    pkg_path: &str,
    func: &str,
    args: I,
) -> Result<MsgCall, MsgError>
where
    I: IntoIterator<Item = A>,
    A: ToString,
{
    if caller.is_empty() {
        return Err(MsgError::MissingCaller);
    }

    Ok(MsgCall {
        caller: caller.to_string(),
        send: String::new(),
        pkg_path: pkg_path.to_string(),
        func: func.to_string(),
        args: args.into_iter().map(|a| a.to_string()).collect(),
    })
}

/// `CreatePost(bid, title, body)`
pub fn create_post_msg(
    caller: &str,
    pkg_path: &str,
    bid: u64,
    title: &str,
    body: &str,
) -> Result<MsgCall, MsgError> {
    build_call_message(
        caller,
        pkg_path,
        CREATE_POST,
        [bid.to_string(), title.to_string(), body.to_string()],
    )
}

/// `CreateReply(bid, thread_id, post_id, body)`
pub fn create_reply_msg(
    caller: &str,
    pkg_path: &str,
    bid: u64,
    thread_id: u64,
    post_id: u64,
    body: &str,
) -> Result<MsgCall, MsgError> {
    build_call_message(
        caller,
        pkg_path,
        CREATE_REPLY,
        [
            bid.to_string(),
            thread_id.to_string(),
            post_id.to_string(),
            body.to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLER: &str = "g1jg8mtutu9khhfwc4nxmuhcpftf0pajdhfvsqf5";
    const BOARDS: &str = "gno.land/r/boards";

    #[test]
    fn test_create_reply_msg() {
        let msg = create_reply_msg(CALLER, BOARDS, 3, 7, 12, "hello").unwrap();
        assert_eq!(msg.func, "CreateReply");
        assert_eq!(msg.args, vec!["3", "7", "12", "hello"]);
        assert_eq!(msg.send, "");
        assert_eq!(msg.pkg_path, BOARDS);
    }

    #[test]
    fn test_create_post_msg() {
        let msg = create_post_msg(CALLER, BOARDS, 1, "title", "body text").unwrap();
        assert_eq!(msg.func, "CreatePost");
        assert_eq!(msg.args, vec!["1", "title", "body text"]);
    }

    #[test]
    fn test_missing_caller() {
        assert_eq!(
            build_call_message("", BOARDS, "Anything", Vec::<String>::new()),
            Err(MsgError::MissingCaller)
        );
    }

    #[test]
    fn test_args_are_not_checked() {
        let msg = build_call_message(CALLER, BOARDS, CREATE_REPLY, [1, 2]).unwrap();
        assert_eq!(msg.args, vec!["1", "2"]);
    }

    #[test]
    fn test_to_amino() {
        let msg = create_post_msg(CALLER, BOARDS, 1, "t", "b").unwrap();
        let amino = msg.to_amino();
        assert_eq!(amino.type_url, "/vm.m_call");
        assert_eq!(
            amino.value,
            serde_json::json!({
                "caller": CALLER,
                "send": "",
                "pkg_path": BOARDS,
                "func": "CreatePost",
                "args": ["1", "t", "b"],
            })
        );
    }
}
