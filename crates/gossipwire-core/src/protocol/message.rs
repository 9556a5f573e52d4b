//! Message engine: schema-driven decode and encode.
//!
//! Decoding walks the chosen schema in order, feeding the buffer through each
//! entry's codec. Bytes left after the last entry become the `remainder`
//! field, so that `encode(decode(b)) == b` holds for any accepted buffer,
//! including messages extended by newer protocol versions.

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{GossipWireError, Result};
use crate::protocol::element::{Element, ElementValue, FieldValue};
use crate::protocol::field::FieldId;
use crate::protocol::schema::{self, VariantSchema};
use crate::protocol::types::{MessageType, Remainder};
use crate::protocol::variant::Variant;

/// A decoded (or built) message: discriminator, one slot per schema entry in
/// wire order, and any trailing bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    msg_type: MessageType,
    fields: Vec<(FieldId, ElementValue)>,
    remainder: Option<Remainder>,
}

/// Decode a framed message, resolving the schema from its discriminator.
///
/// Uncatalogued type ids yield a generic message holding the discriminator
/// and everything after it as `remainder`.
pub fn decode(buf: Bytes) -> Result<Message> {
    let msg_type = peek_type(&buf)?;
    match msg_type.variant() {
        Some(variant) => decode_with_schema(buf, variant),
        None => {
            tracing::debug!(type_id = msg_type.0, len = buf.len(), "uncatalogued message type");
            let (fields, remainder) = run_schema(buf, schema::UNKNOWN)?;
            Ok(Message {
                msg_type,
                fields,
                remainder,
            })
        }
    }
}

/// Like [`decode`], but uncatalogued type ids are an error.
pub fn decode_known(buf: Bytes) -> Result<Message> {
    let msg_type = peek_type(&buf)?;
    let variant = msg_type
        .variant()
        .ok_or(GossipWireError::UnknownDiscriminator(msg_type.0))?;
    decode_with_schema(buf, variant)
}

/// Decode against a schema chosen by the caller. The discriminator in the
/// buffer must match the variant.
pub fn decode_with_schema(buf: Bytes, variant: Variant) -> Result<Message> {
    let msg_type = peek_type(&buf)?;
    if msg_type.0 != variant.id() {
        return Err(GossipWireError::WrongVariant {
            expected: variant.name(),
            found: msg_type.name(),
        });
    }
    let (fields, remainder) = run_schema(buf, variant.schema())?;
    tracing::trace!(
        msg = variant.name(),
        fields = fields.len(),
        remainder = remainder.as_ref().map_or(0, Remainder::len),
        "decoded"
    );
    Ok(Message {
        msg_type,
        fields,
        remainder,
    })
}

fn peek_type(buf: &Bytes) -> Result<MessageType> {
    let mut head = buf.slice(..buf.len().min(2));
    MessageType::decode(&mut head).map_err(|e| e.at_field(FieldId::Type))
}

type Decoded = (Vec<(FieldId, ElementValue)>, Option<Remainder>);

fn run_schema(mut buf: Bytes, schema: VariantSchema) -> Result<Decoded> {
    let mut fields = Vec::with_capacity(schema.len());
    for entry in schema {
        let value = entry
            .kind
            .decode(&mut buf)
            .map_err(|e| e.at_field(entry.field))?;
        fields.push((entry.field, value));
    }

    let remainder = if buf.has_remaining() {
        Some(Remainder::decode(&mut buf)?)
    } else {
        None
    };

    if buf.has_remaining() {
        let left = buf.remaining();
        tracing::error!(left, "remainder codec left bytes unconsumed");
        return Err(GossipWireError::TrailingDataInvariantViolation { left });
    }

    Ok((fields, remainder))
}

impl Message {
    /// Assemble from values that already match `variant`'s schema, in order,
    /// discriminator excluded. Only used by the typed builders.
    pub(crate) fn assemble(variant: Variant, values: Vec<ElementValue>) -> Self {
        let schema = variant.schema();
        debug_assert_eq!(values.len() + 1, schema.len(), "variant={variant}");
        let mut fields = Vec::with_capacity(schema.len());
        fields.push((FieldId::Type, MessageType::from(variant).into_value()));
        for (entry, value) in schema[1..].iter().zip(values) {
            debug_assert_eq!(entry.kind, value.kind(), "field={}", entry.field);
            fields.push((entry.field, value));
        }
        Message {
            msg_type: MessageType::from(variant),
            fields,
            remainder: None,
        }
    }

    /// Build a message from loose values, checking them against the schema.
    /// `values` excludes the discriminator.
    pub fn from_values(variant: Variant, values: Vec<ElementValue>) -> Result<Self> {
        let schema = &variant.schema()[1..];
        if values.len() != schema.len() {
            return Err(GossipWireError::Malformed(format!(
                "{variant} takes {} fields, got {}",
                schema.len(),
                values.len()
            )));
        }
        for (entry, value) in schema.iter().zip(&values) {
            if entry.kind != value.kind() {
                return Err(GossipWireError::Malformed(format!(
                    "{variant}.{} expects {:?}, got {:?}",
                    entry.field,
                    entry.kind,
                    value.kind()
                )));
            }
        }
        Ok(Self::assemble(variant, values))
    }

    /// Same message with `remainder` attached as trailing bytes.
    pub fn with_remainder(mut self, remainder: Remainder) -> Self {
        self.remainder = (!remainder.is_empty()).then_some(remainder);
        self
    }

    pub fn type_id(&self) -> u16 {
        self.msg_type.0
    }

    pub fn type_name(&self) -> &'static str {
        self.msg_type.name()
    }

    pub fn message_type(&self) -> MessageType {
        self.msg_type
    }

    pub fn variant(&self) -> Option<Variant> {
        self.msg_type.variant()
    }

    /// Schema fields in wire order (discriminator included, remainder not).
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &ElementValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn get(&self, field: FieldId) -> Option<&ElementValue> {
        self.fields
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| v)
    }

    /// Whether the message carries `field`; `remainder` counts when present.
    pub fn contains(&self, field: FieldId) -> bool {
        match field {
            FieldId::Remainder => self.remainder.is_some(),
            other => self.get(other).is_some(),
        }
    }

    pub fn remainder(&self) -> Option<&Remainder> {
        self.remainder.as_ref()
    }

    pub fn encode_into(&self, out: &mut BytesMut) {
        for (_, value) in &self.fields {
            value.encode(out);
        }
        if let Some(rem) = &self.remainder {
            rem.encode(out);
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::new();
        self.encode_into(&mut out);
        out.freeze()
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        self.encode().len()
    }

    /// Typed, in-order access to the fields after the discriminator.
    pub(crate) fn reader(&self, expected: Variant) -> Result<FieldReader<'_>> {
        if self.variant() != Some(expected) {
            return Err(GossipWireError::WrongVariant {
                expected: expected.name(),
                found: self.type_name(),
            });
        }
        Ok(FieldReader { msg: self, pos: 1 })
    }
}

pub(crate) struct FieldReader<'a> {
    msg: &'a Message,
    pos: usize,
}

impl FieldReader<'_> {
    pub(crate) fn next<T: FieldValue>(&mut self) -> Result<T> {
        let (field, value) = self
            .msg
            .fields
            .get(self.pos)
            .ok_or_else(|| GossipWireError::Internal("read past last field".into()))?;
        self.pos += 1;
        T::from_value(value).ok_or_else(|| {
            GossipWireError::Internal(format!(
                "{field} holds {:?}, read as {:?}",
                value.kind(),
                T::KIND
            ))
        })
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::MessageType(v) => write!(f, "{}", v.0),
            ElementValue::U8(v) => write!(f, "{v}"),
            ElementValue::U16(v) => write!(f, "{v}"),
            ElementValue::U32(v) => write!(f, "{v}"),
            ElementValue::U64(v) => write!(f, "{v}"),
            ElementValue::Signature(v) => write!(f, "{v}"),
            ElementValue::Point(v) => write!(f, "{v}"),
            ElementValue::ChainHash(v) => write!(f, "{v}"),
            ElementValue::ShortChannelId(v) => write!(f, "{v}"),
            ElementValue::RgbColor(v) => write!(f, "#{v}"),
            ElementValue::Alias(v) => write!(f, "{:?}", v.to_string_lossy()),
            ElementValue::VarBytes(v) => write!(f, "0x{}", hex::encode(v.as_bytes())),
            ElementValue::Remainder(v) => write!(f, "0x{}", hex::encode(&v.0)),
            ElementValue::EncodedShortChannelIds(v) => {
                write!(f, "[enc={}] 0x{}", v.encoding.as_byte(), hex::encode(&v.body))
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        let mut first = true;
        for (field, value) in &self.fields {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{field}: {value}")?;
        }
        if let Some(rem) = &self.remainder {
            write!(f, ", {}: 0x{}", FieldId::Remainder, hex::encode(&rem.0))?;
        }
        f.write_str(")")
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = usize::from(self.remainder.is_some());
        let mut m = s.serialize_map(Some(self.fields.len() + 1 + extra))?;
        m.serialize_entry("name", self.type_name())?;
        for (field, value) in &self.fields {
            m.serialize_entry(field.as_str(), value)?;
        }
        if let Some(rem) = &self.remainder {
            m.serialize_entry(FieldId::Remainder.as_str(), &hex::encode(&rem.0))?;
        }
        m.end()
    }
}
