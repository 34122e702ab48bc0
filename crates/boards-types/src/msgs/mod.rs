//! Message types carried by boards transactions

pub mod vm;

pub use vm::{
    build_call_message, create_post_msg, create_reply_msg, MsgCall, MsgError, CREATE_POST,
    CREATE_REPLY, MSG_CALL_TYPE,
};
