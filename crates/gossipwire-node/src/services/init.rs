use async_trait::async_trait;

use gossipwire_core::error::Result;
use gossipwire_core::protocol::typed::Init;
use gossipwire_core::{Message, Variant};

use crate::dispatch::MessageService;
use crate::session::PeerSession;

/// Records the feature bits a peer advertised in `init`.
#[derive(Default)]
pub struct InitService;

impl InitService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageService for InitService {
    fn name(&self) -> &'static str {
        "init"
    }

    fn variants(&self) -> &'static [Variant] {
        &[Variant::Init]
    }

    async fn handle(&self, peer: PeerSession, msg: Message) -> Result<()> {
        let init = msg.to_typed::<Init>()?;
        tracing::info!(
            peer = peer.peer_id(),
            global = %hex::encode(init.global_features.as_bytes()),
            local = %hex::encode(init.local_features.as_bytes()),
            tlv_bytes = msg.remainder().map_or(0, |r| r.len()),
            "peer init"
        );
        peer.set_remote_init(init).await;
        Ok(())
    }
}
