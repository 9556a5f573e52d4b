//! Element contract: the primitive codec every field type implements.
//!
//! Decoding rules:
//! - `decode` consumes from the front of the buffer; what is left is the
//!   remaining buffer for the next field.
//! - Never index (`buf[0]`); check `remaining()` first, then use `Buf`.
//! - Short input is `Underflow`, never a panic.
//!
//! For any buffer `b` where `decode(b)` yields `v` and leaves `rest`,
//! `encode(v) ++ rest == b`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{GossipWireError, Result};
use crate::protocol::types::{
    Alias, ChainHash, EncodedShortChannelIds, MessageType, Point, Remainder, RgbColor,
    ScidEncoding, ShortChannelId, Signature, VarBytes,
};

/// Primitive codec.
pub trait Element: Sized {
    const KIND: ElementKind;

    fn decode(buf: &mut Bytes) -> Result<Self>;
    fn encode(&self, out: &mut BytesMut);
}

/// Conversion between a concrete element and the type-erased slot value.
pub trait FieldValue: Element {
    fn into_value(self) -> ElementValue;
    fn from_value(value: &ElementValue) -> Option<Self>;
}

fn ensure(buf: &Bytes, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(GossipWireError::underflow(needed, buf.remaining()));
    }
    Ok(())
}

fn take_array<const N: usize>(buf: &mut Bytes) -> Result<[u8; N]> {
    ensure(buf, N)?;
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

impl Element for u8 {
    const KIND: ElementKind = ElementKind::U8;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        ensure(buf, 1)?;
        Ok(buf.get_u8())
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(*self);
    }
}

impl Element for u16 {
    const KIND: ElementKind = ElementKind::U16;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        ensure(buf, 2)?;
        Ok(buf.get_u16())
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u16(*self);
    }
}

impl Element for u32 {
    const KIND: ElementKind = ElementKind::U32;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        ensure(buf, 4)?;
        Ok(buf.get_u32())
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u32(*self);
    }
}

impl Element for u64 {
    const KIND: ElementKind = ElementKind::U64;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        ensure(buf, 8)?;
        Ok(buf.get_u64())
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u64(*self);
    }
}

impl Element for MessageType {
    const KIND: ElementKind = ElementKind::MessageType;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        u16::decode(buf).map(MessageType)
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u16(self.0);
    }
}

impl Element for ShortChannelId {
    const KIND: ElementKind = ElementKind::ShortChannelId;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        u64::decode(buf).map(ShortChannelId)
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u64(self.0);
    }
}

macro_rules! fixed_element {
    ($ty:ident, $kind:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;

            fn decode(buf: &mut Bytes) -> Result<Self> {
                take_array::<{ $ty::LEN }>(buf).map($ty)
            }

            fn encode(&self, out: &mut BytesMut) {
                out.put_slice(&self.0);
            }
        }
    };
}

fixed_element!(Signature, Signature);
fixed_element!(Point, Point);
fixed_element!(ChainHash, ChainHash);
fixed_element!(RgbColor, RgbColor);
fixed_element!(Alias, Alias);

impl Element for VarBytes {
    const KIND: ElementKind = ElementKind::VarBytes;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let len = usize::from(u16::decode(buf)?);
        if buf.remaining() < len {
            return Err(GossipWireError::underflow(len + 2, buf.remaining() + 2));
        }
        VarBytes::new(buf.copy_to_bytes(len))
    }

    fn encode(&self, out: &mut BytesMut) {
        // Length fits: VarBytes::new refuses anything longer than u16::MAX.
        out.put_u16(self.len() as u16);
        out.put_slice(self.as_bytes());
    }
}

impl Element for EncodedShortChannelIds {
    const KIND: ElementKind = ElementKind::EncodedShortChannelIds;

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let len = usize::from(u16::decode(buf)?);
        if len == 0 {
            return Err(GossipWireError::Malformed(
                "encoded short channel ids without encoding byte".into(),
            ));
        }
        if buf.remaining() < len {
            return Err(GossipWireError::underflow(len + 2, buf.remaining() + 2));
        }
        let encoding = ScidEncoding::from_byte(buf.get_u8());
        let body = buf.copy_to_bytes(len - 1);
        Ok(EncodedShortChannelIds { encoding, body })
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u16((self.body.len() + 1) as u16);
        out.put_u8(self.encoding.as_byte());
        out.put_slice(&self.body);
    }
}

impl Element for Remainder {
    const KIND: ElementKind = ElementKind::Remainder;

    /// Takes everything; never fails.
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Remainder(std::mem::take(buf)))
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_slice(&self.0);
    }
}

macro_rules! element_values {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Which codec a schema entry uses.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ElementKind {
            $($variant,)*
        }

        /// A decoded field value. Immutable once built.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum ElementValue {
            $($variant($ty),)*
        }

        impl ElementKind {
            /// Run this kind's codec.
            pub fn decode(self, buf: &mut Bytes) -> Result<ElementValue> {
                match self {
                    $(ElementKind::$variant => <$ty>::decode(buf).map(ElementValue::$variant),)*
                }
            }
        }

        impl ElementValue {
            pub fn kind(&self) -> ElementKind {
                match self {
                    $(ElementValue::$variant(_) => ElementKind::$variant,)*
                }
            }

            pub fn encode(&self, out: &mut BytesMut) {
                match self {
                    $(ElementValue::$variant(v) => v.encode(out),)*
                }
            }
        }

        $(
            impl FieldValue for $ty {
                fn into_value(self) -> ElementValue {
                    ElementValue::$variant(self)
                }

                fn from_value(value: &ElementValue) -> Option<Self> {
                    match value {
                        ElementValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

element_values! {
    MessageType(MessageType),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Signature(Signature),
    Point(Point),
    ChainHash(ChainHash),
    ShortChannelId(ShortChannelId),
    RgbColor(RgbColor),
    Alias(Alias),
    VarBytes(VarBytes),
    EncodedShortChannelIds(EncodedShortChannelIds),
    Remainder(Remainder),
}

impl Serialize for ElementValue {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ElementValue::MessageType(v) => s.serialize_u16(v.0),
            ElementValue::U8(v) => s.serialize_u8(*v),
            ElementValue::U16(v) => s.serialize_u16(*v),
            ElementValue::U32(v) => s.serialize_u32(*v),
            ElementValue::U64(v) => s.serialize_u64(*v),
            ElementValue::Signature(v) => s.collect_str(v),
            ElementValue::Point(v) => s.collect_str(v),
            ElementValue::ChainHash(v) => s.collect_str(v),
            ElementValue::ShortChannelId(v) => s.collect_str(v),
            ElementValue::RgbColor(v) => s.collect_str(v),
            ElementValue::Alias(v) => s.collect_str(&v.to_string_lossy()),
            ElementValue::VarBytes(v) => s.serialize_str(&hex::encode(v.as_bytes())),
            ElementValue::Remainder(v) => s.serialize_str(&hex::encode(&v.0)),
            ElementValue::EncodedShortChannelIds(v) => {
                let mut m = s.serialize_map(Some(2))?;
                m.serialize_entry("encoding", &v.encoding.as_byte())?;
                m.serialize_entry("data", &hex::encode(&v.body))?;
                m.end()
            }
        }
    }
}
