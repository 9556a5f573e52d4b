//! Built-in message services.

pub mod gossip;
pub mod init;
pub mod ping;

pub use gossip::GossipService;
pub use init::InitService;
pub use ping::PingService;
