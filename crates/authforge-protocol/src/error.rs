//! Error types for the protocol layer.

/// Errors raised while converting a [`LocalUser`](crate::LocalUser) to or
/// from its remote profile document.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The user could not be turned into a profile document.
    #[error("profile encode failed: {0}")]
    Encode(serde_json::Error),

    /// A remote profile document has the wrong shape, for example a
    /// `name` that is a number instead of a string.
    #[error("profile decode failed: {0}")]
    Decode(serde_json::Error),

    /// The document decoded but is not a JSON object.
    #[error("invalid profile document: {0}")]
    InvalidProfile(String),
}
