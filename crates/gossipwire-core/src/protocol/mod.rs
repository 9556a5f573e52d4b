//! Protocol modules, leaves first.
//!
//! - `types` / `element`: primitive wire values and the codec contract.
//! - `field`: the closed set of field identifiers.
//! - `schema`: one constant, fully materialised field table per variant.
//! - `variant`: the catalogue mapping type ids to names and schemas.
//! - `message`: the generic decode/encode engine.
//! - `typed`: per-variant structs with compile-time checked field access.
//!
//! All parsers are panic-free: they go through `bytes::Buf` with
//! `remaining()` checks and never index raw buffers.

pub mod element;
pub mod field;
pub mod message;
pub mod schema;
pub mod typed;
pub mod types;
pub mod variant;
