//! Per-variant service registry and dispatcher.

pub mod dispatcher;

pub use dispatcher::{Dispatched, Dispatcher, MessageService};
