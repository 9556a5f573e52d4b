use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use gossipwire_core::error::{GossipWireError, Result};
use gossipwire_core::{Message, Variant};

use crate::session::PeerSession;

/// A handler for one or more catalogued message variants.
#[async_trait]
pub trait MessageService: Send + Sync {
    fn name(&self) -> &'static str;
    fn variants(&self) -> &'static [Variant];
    async fn handle(&self, peer: PeerSession, msg: Message) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Handled,
    /// Unknown odd type, or a catalogued type nobody registered for.
    Ignored,
}

#[derive(Default)]
pub struct Dispatcher {
    services: DashMap<Variant, Arc<dyn MessageService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `svc` for every variant it declares. Later registrations win.
    pub fn register(&self, svc: Arc<dyn MessageService>) {
        for v in svc.variants() {
            if let Some(prev) = self.services.insert(*v, Arc::clone(&svc)) {
                tracing::warn!(variant = %v, old = prev.name(), new = svc.name(), "service replaced");
            }
        }
    }

    pub fn registered(&self) -> Vec<Variant> {
        let mut out: Vec<Variant> = self.services.iter().map(|e| *e.key()).collect();
        out.sort();
        out
    }

    /// Route a decoded message.
    ///
    /// Uncatalogued types follow the parity rule: odd ids are ignored, even
    /// ids fail with `UnknownDiscriminator` and the peer should be dropped.
    pub async fn dispatch(&self, peer: PeerSession, msg: Message) -> Result<Dispatched> {
        let Some(variant) = msg.variant() else {
            let ty = msg.message_type();
            if ty.is_odd() {
                tracing::debug!(type_id = ty.0, peer = peer.peer_id(), "ignoring unknown odd message");
                return Ok(Dispatched::Ignored);
            }
            return Err(GossipWireError::UnknownDiscriminator(ty.0));
        };

        let handler = match self.services.get(&variant) {
            Some(h) => Arc::clone(h.value()),
            None => {
                tracing::debug!(%variant, "no service registered");
                return Ok(Dispatched::Ignored);
            }
        };
        handler.handle(peer, msg).await?;
        Ok(Dispatched::Handled)
    }
}
