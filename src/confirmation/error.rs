//! Error types for the confirmation page.

use std::fmt;

use thiserror::Error;

/// An outside capability the confirmation page delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    VisualCode,
    DocumentExport,
    Clipboard,
    NativeShare,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::VisualCode => "QR code rendering",
            Capability::DocumentExport => "PDF generation",
            Capability::Clipboard => "Clipboard",
            Capability::NativeShare => "Sharing",
        })
    }
}

/// Failure reported by a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} not available")]
    Unavailable(Capability),

    #[error("{capability} failed: {source}")]
    Failed {
        capability: Capability,
        source: CapabilityError,
    },

    #[error("could not encode ticket payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("cannot read event start '{date} {time}': {source}")]
    EventStart {
        date: String,
        time: String,
        source: chrono::ParseError,
    },
}
