//! gossipwire node library.
//!
//! Wires the decode-once codec, the per-variant dispatcher, peer sessions
//! and the built-in gossip services into a node that can be driven by the
//! replay transport (`main.rs`) or by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod services;
pub mod session;
pub mod transport;
