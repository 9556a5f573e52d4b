//! Frame transport: decode-once codec and the hex line replay driver.

pub mod codec;
pub mod replay;
