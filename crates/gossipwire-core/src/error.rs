//! Shared error type across gossipwire crates.

use thiserror::Error;

use crate::protocol::field::FieldId;

/// Stable error codes (used by logs, metrics labels and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A codec needed more bytes than the buffer held.
    Underflow,
    /// Discriminator has no catalogued schema.
    UnknownDiscriminator,
    /// Engine invariant broken (codec bug).
    InvariantViolation,
    /// Typed conversion applied to a message of another variant.
    WrongVariant,
    /// Structurally invalid value.
    Malformed,
    /// Short channel id list encoding that cannot be expanded.
    UnsupportedEncoding,
    /// Frame larger than the configured limit.
    PayloadTooLarge,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Underflow => "UNDERFLOW",
            ErrorCode::UnknownDiscriminator => "UNKNOWN_DISCRIMINATOR",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::WrongVariant => "WRONG_VARIANT",
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::UnsupportedEncoding => "UNSUPPORTED_ENCODING",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GossipWireError>;

/// Unified error type used by core and node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GossipWireError {
    #[error(
        "underflow decoding {}: need {needed} bytes, have {available}",
        .field.map(FieldId::as_str).unwrap_or("element")
    )]
    Underflow {
        field: Option<FieldId>,
        needed: usize,
        available: usize,
    },
    #[error("unknown message type {0}")]
    UnknownDiscriminator(u16),
    #[error("{left} bytes left after remainder capture")]
    TrailingDataInvariantViolation { left: usize },
    #[error("expected {expected} message, found {found}")]
    WrongVariant {
        expected: &'static str,
        found: &'static str,
    },
    #[error("malformed: {0}")]
    Malformed(String),
    #[error("unsupported short channel id encoding {0}")]
    UnsupportedEncoding(u8),
    #[error("message of {len} bytes exceeds limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("bad config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GossipWireError {
    pub(crate) fn underflow(needed: usize, available: usize) -> Self {
        GossipWireError::Underflow {
            field: None,
            needed,
            available,
        }
    }

    /// Attach the field being decoded to an underflow raised by a codec.
    pub fn at_field(self, at: FieldId) -> Self {
        match self {
            GossipWireError::Underflow {
                field: None,
                needed,
                available,
            } => GossipWireError::Underflow {
                field: Some(at),
                needed,
                available,
            },
            other => other,
        }
    }

    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GossipWireError::Underflow { .. } => ErrorCode::Underflow,
            GossipWireError::UnknownDiscriminator(_) => ErrorCode::UnknownDiscriminator,
            GossipWireError::TrailingDataInvariantViolation { .. } => {
                ErrorCode::InvariantViolation
            }
            GossipWireError::WrongVariant { .. } => ErrorCode::WrongVariant,
            GossipWireError::Malformed(_) => ErrorCode::Malformed,
            GossipWireError::UnsupportedEncoding(_) => ErrorCode::UnsupportedEncoding,
            GossipWireError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            GossipWireError::Config(_) => ErrorCode::BadConfig,
            GossipWireError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            GossipWireError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for implementation bugs, as opposed to bad input from a peer.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GossipWireError::TrailingDataInvariantViolation { .. } | GossipWireError::Internal(_)
        )
    }
}
