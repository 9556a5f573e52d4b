//! gossipwire core: schema-driven framing for Lightning-style gossip messages.
//!
//! This crate defines the element codecs, the field registry, the per-variant
//! schema tables and the message engine that turns a framed byte buffer into
//! an ordered set of typed fields and back. It carries no transport or runtime
//! dependencies so it can be embedded in any peer implementation.
//!
//! # Guarantees
//! - `encode(decode(b)) == b` for every buffer `decode` accepts, including
//!   unknown trailing bytes, which are kept as the `remainder` field.
//! - Panics, `unwrap` and `expect` are compile-denied here. Malformed input
//!   surfaces as `GossipWireError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, GossipWireError, Result};
pub use protocol::message::{decode, decode_known, decode_with_schema, Message};
pub use protocol::variant::Variant;
