//! Error taxonomy of the mapping layer.
//!
//! Only programmer/configuration mistakes surface here. Gateway-reported
//! business outcomes (declined, rejected, bank-call-required) are data, not
//! errors: they travel in [`crate::PosResponse`] status fields.

/// Errors raised while building a gateway request or decoding a reply.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MappingError {
    /// A precondition input is absent (card missing where mandatory,
    /// 3-D Secure proofs missing before completing a payment).
    #[error("Missing required field: {field_name}")]
    MissingRequiredField {
        /// Canonical name of the absent field.
        field_name: &'static str,
    },
    /// The operation is not offered by this gateway family. Distinct from
    /// input validation so callers can branch on capability.
    #[error("{operation} is not implemented for {gateway}")]
    NotImplemented {
        /// Operation that was requested.
        operation: &'static str,
        /// Gateway family that does not offer it.
        gateway: &'static str,
    },
    /// An input field is present but malformed.
    #[error("Invalid data format for field: {field_name}")]
    InvalidDataFormat {
        /// Canonical name of the malformed field.
        field_name: &'static str,
    },
    /// A canonical value has no entry in a gateway translation table. This
    /// is a configuration error, not a runtime recoverable condition.
    #[error("No {table} translation for `{value}`")]
    TranslationMissing {
        /// Table that was consulted.
        table: &'static str,
        /// Canonical value that missed.
        value: String,
    },
    /// The injected crypt capability failed to produce a hash.
    #[error("Failed to compute the 3-D Secure hash")]
    HashComputationFailed,
    /// A gateway payload could not be encoded. Payload structs are plain
    /// string maps, so this points at a programming error.
    #[error("Failed to encode gateway request")]
    RequestEncodingFailed,
}

/// Result alias used throughout the mapping layer.
pub type MappingResult<T> = error_stack::Result<T, MappingError>;
