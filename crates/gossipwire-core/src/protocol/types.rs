//! Primitive wire values carried by message fields.
//!
//! Fixed-size values are plain byte arrays wrapped in newtypes so that a
//! 33-byte point can never be passed where a 32-byte chain hash is expected.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{GossipWireError, Result};
use crate::protocol::variant::Variant;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Encoded width in bytes.
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(v: [u8; $len]) -> Self {
                Self(v)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = GossipWireError;

            fn try_from(v: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = v.try_into().map_err(|_| {
                    GossipWireError::Malformed(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        v.len()
                    ))
                })?;
                Ok(Self(arr))
            }
        }

        impl FromStr for $name {
            type Err = GossipWireError;

            fn from_str(s: &str) -> Result<Self> {
                let mut out = [0u8; $len];
                hex::decode_to_slice(s, &mut out).map_err(|e| {
                    GossipWireError::Malformed(format!("{}: {e}", stringify!($name)))
                })?;
                Ok(Self(out))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

fixed_bytes!(
    /// Compact ECDSA signature.
    Signature,
    64
);
fixed_bytes!(
    /// Compressed secp256k1 point (node ids, bitcoin keys).
    Point,
    33
);
fixed_bytes!(
    /// Genesis block hash identifying the chain.
    ChainHash,
    32
);
fixed_bytes!(
    /// Node alias, UTF-8 padded with zero bytes.
    Alias,
    32
);
fixed_bytes!(RgbColor, 3);

impl ChainHash {
    pub const BITCOIN: ChainHash = ChainHash([
        0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72, 0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7,
        0x4f, 0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c, 0x68, 0xd6, 0x19, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TESTNET: ChainHash = ChainHash([
        0x43, 0x49, 0x7f, 0xd7, 0xf8, 0x26, 0x95, 0x71, 0x08, 0xf4, 0xa3, 0x0f, 0xd9, 0xce, 0xc3,
        0xae, 0xba, 0x79, 0x97, 0x20, 0x84, 0xe9, 0x0e, 0xad, 0x01, 0xea, 0x33, 0x09, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const REGTEST: ChainHash = ChainHash([
        0x06, 0x22, 0x6e, 0x46, 0x11, 0x1a, 0x0b, 0x59, 0xca, 0xaf, 0x12, 0x60, 0x43, 0xeb, 0x5b,
        0xbf, 0x28, 0xc3, 0x4f, 0x3a, 0x5e, 0x33, 0x2a, 0x1f, 0xc7, 0xb2, 0xb7, 0x3c, 0xf1, 0x88,
        0x91, 0x0f,
    ]);

    /// Name of a well-known chain.
    pub fn network(&self) -> Option<&'static str> {
        match *self {
            ChainHash::BITCOIN => Some("bitcoin"),
            ChainHash::TESTNET => Some("testnet"),
            ChainHash::REGTEST => Some("regtest"),
            _ => None,
        }
    }
}

impl Alias {
    /// Alias text with trailing zero padding stripped (lossy UTF-8).
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

/// Message discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageType(pub u16);

impl MessageType {
    pub fn variant(self) -> Option<Variant> {
        Variant::from_id(self.0)
    }

    /// Catalogued name, or `unknown`.
    pub fn name(self) -> &'static str {
        self.variant().map_or("unknown", Variant::name)
    }

    /// BOLT #1 parity: odd types may be ignored by peers that don't know them.
    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl From<Variant> for MessageType {
    fn from(v: Variant) -> Self {
        MessageType(v.id())
    }
}

/// Blockchain-anchored channel id: 3 bytes block height, 3 bytes
/// transaction index, 2 bytes output index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortChannelId(pub u64);

impl ShortChannelId {
    pub const LEN: usize = 8;
    const MAX_24: u32 = 0x00ff_ffff;

    pub fn new(block_height: u32, tx_index: u32, output_index: u16) -> Result<Self> {
        if block_height > Self::MAX_24 || tx_index > Self::MAX_24 {
            return Err(GossipWireError::Malformed(format!(
                "short channel id {block_height}x{tx_index}x{output_index} out of range"
            )));
        }
        Ok(Self(
            (u64::from(block_height) << 40) | (u64::from(tx_index) << 16) | u64::from(output_index),
        ))
    }

    pub fn block_height(self) -> u32 {
        (self.0 >> 40) as u32
    }

    pub fn tx_index(self) -> u32 {
        ((self.0 >> 16) as u32) & Self::MAX_24
    }

    pub fn output_index(self) -> u16 {
        self.0 as u16
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}",
            self.block_height(),
            self.tx_index(),
            self.output_index()
        )
    }
}

impl fmt::Debug for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortChannelId({self})")
    }
}

impl FromStr for ShortChannelId {
    type Err = GossipWireError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || GossipWireError::Malformed(format!("invalid short channel id: {s}"));
        let mut parts = s.split('x');
        let (Some(block), Some(tx), Some(out), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        Self::new(
            block.parse().map_err(|_| bad())?,
            tx.parse().map_err(|_| bad())?,
            out.parse().map_err(|_| bad())?,
        )
    }
}

/// Bytes behind a 2-byte big-endian length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarBytes(Bytes);

impl VarBytes {
    pub const MAX_LEN: usize = u16::MAX as usize;

    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() > Self::MAX_LEN {
            return Err(GossipWireError::Malformed(format!(
                "{} bytes do not fit a u16 length prefix",
                data.len()
            )));
        }
        Ok(Self(data))
    }

    /// `len` copies of `byte`; always fits the prefix.
    pub fn filled(byte: u8, len: u16) -> Self {
        Self(Bytes::from(vec![byte; usize::from(len)]))
    }

    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same bytes read as a feature bitfield: bit 0 is the least significant
    /// bit of the last byte.
    pub fn has_feature_bit(&self, bit: usize) -> bool {
        let byte = bit / 8;
        if byte >= self.0.len() {
            return false;
        }
        let idx = self.0.len() - 1 - byte;
        self.0
            .get(idx)
            .map_or(false, |b| b & (1 << (bit % 8)) != 0)
    }
}

/// Unstructured bytes past the end of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Remainder(pub Bytes);

impl Remainder {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encoding byte of an encoded short channel id list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScidEncoding {
    /// Flat array of 8-byte ids.
    Uncompressed,
    /// zlib-compressed array (deprecated in BOLT #7, kept opaque here).
    Zlib,
    Other(u8),
}

impl ScidEncoding {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => ScidEncoding::Uncompressed,
            1 => ScidEncoding::Zlib,
            other => ScidEncoding::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            ScidEncoding::Uncompressed => 0,
            ScidEncoding::Zlib => 1,
            ScidEncoding::Other(b) => b,
        }
    }
}

/// Length-prefixed list of short channel ids: one encoding byte followed by
/// the encoded body. The body is kept verbatim so re-encoding is exact even
/// for encodings this crate cannot expand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedShortChannelIds {
    pub encoding: ScidEncoding,
    pub body: Bytes,
}

impl EncodedShortChannelIds {
    /// Largest body that still fits the u16 length prefix with the encoding byte.
    pub const MAX_BODY: usize = u16::MAX as usize - 1;

    pub fn uncompressed(ids: &[ShortChannelId]) -> Result<Self> {
        let len = ids.len() * ShortChannelId::LEN;
        if len > Self::MAX_BODY {
            return Err(GossipWireError::Malformed(format!(
                "{} short channel ids do not fit one list",
                ids.len()
            )));
        }
        let mut body = Vec::with_capacity(len);
        for id in ids {
            body.extend_from_slice(&id.0.to_be_bytes());
        }
        Ok(Self {
            encoding: ScidEncoding::Uncompressed,
            body: Bytes::from(body),
        })
    }

    /// Expand the list. Only the uncompressed encoding is supported.
    pub fn short_channel_ids(&self) -> Result<Vec<ShortChannelId>> {
        if self.encoding != ScidEncoding::Uncompressed {
            return Err(GossipWireError::UnsupportedEncoding(self.encoding.as_byte()));
        }
        if self.body.len() % ShortChannelId::LEN != 0 {
            return Err(GossipWireError::Malformed(format!(
                "encoded short channel ids: {} bytes is not a multiple of 8",
                self.body.len()
            )));
        }
        Ok(self
            .body
            .chunks_exact(ShortChannelId::LEN)
            .map(|c| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(c);
                ShortChannelId(u64::from_be_bytes(raw))
            })
            .collect())
    }
}
