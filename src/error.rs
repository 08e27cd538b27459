use thiserror::Error;

/// Closed error taxonomy for the stego core.
///
/// Every public operation returns one of these variants. `DecryptFailure` is
/// deliberately uninformative: framing errors, KDF/AEAD failures,
/// decompression failures, and payload-metadata validation failures all
/// collapse to the same variant with the same message so that a caller
/// cannot distinguish "wrong password" from "corrupted data" (see
/// `spec.md` §7 — this is a hard requirement, not an oversight).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    #[error("Unsupported carrier format: {0}")]
    UnsupportedFormat(String),

    #[error("Carrier is corrupt or malformed: {0}")]
    CarrierCorrupt(String),

    #[error("Message is too large for this carrier at the requested depth")]
    CapacityExceeded,

    #[error("LSB depth {0} is not permitted under the current policy")]
    DepthPolicy(u8),

    #[error("No hidden data found in carrier")]
    NoHiddenData,

    #[error("Decryption failed - wrong password or corrupted data")]
    DecryptFailure,

    #[error("Operation cancelled")]
    Cancelled,
}

impl StegoError {
    /// Recommended process exit code for this error kind, per the CLI
    /// mapping in `spec.md` §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            StegoError::UnsupportedFormat(_) | StegoError::DepthPolicy(_) => 2,
            StegoError::CapacityExceeded => 3,
            StegoError::DecryptFailure | StegoError::NoHiddenData => 4,
            StegoError::CarrierCorrupt(_) => 2,
            StegoError::Cancelled => 130,
        }
    }
}
