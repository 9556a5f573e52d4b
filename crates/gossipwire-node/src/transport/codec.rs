//! Decode-once codec between the transport and the dispatcher.
//!
//! Frames are size-checked before any parsing, then decoded exactly once
//! into a [`Message`] that flows through dispatch unchanged.

use bytes::Bytes;

use gossipwire_core::error::{GossipWireError, Result};
use gossipwire_core::{decode_known, Message};

use crate::config::{NodeSection, UnknownMessages};

#[derive(Debug)]
pub struct Inbound {
    pub message: Message,
    pub bytes_len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeLimits {
    pub max_message_bytes: usize,
    pub unknown: UnknownMessages,
}

impl DecodeLimits {
    pub fn from_config(node: &NodeSection) -> Self {
        Self {
            max_message_bytes: node.max_message_bytes,
            unknown: node.unknown_messages,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::from_config(&NodeSection::default())
    }
}

pub fn decode(frame: Bytes, limits: &DecodeLimits) -> Result<Inbound> {
    let bytes_len = frame.len();
    if bytes_len > limits.max_message_bytes {
        return Err(GossipWireError::PayloadTooLarge {
            len: bytes_len,
            max: limits.max_message_bytes,
        });
    }

    let message = match limits.unknown {
        UnknownMessages::Preserve => gossipwire_core::decode(frame)?,
        UnknownMessages::Reject => decode_known(frame)?,
    };
    Ok(Inbound { message, bytes_len })
}

pub fn encode(message: &Message) -> Bytes {
    message.encode()
}
