//! Best-effort classification of provider failures.
//!
//! The provider reports failures as free text, so classification is a
//! substring match over the error's `Display` output.

/// Outcome category for a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured credential was rejected.
    InvalidCredential,
    /// The provider is temporarily unable to serve requests.
    Overloaded,
    /// Anything else.
    Other,
}

/// Marker the provider includes when an API key is rejected. Matched exactly.
const INVALID_KEY_MARKER: &str = "API_KEY_INVALID";

/// Lower-case phrases that indicate a transient overload.
const OVERLOAD_MARKERS: [&str; 3] = ["503", "service unavailable", "overloaded"];

/// Classify provider failure text.
///
/// The invalid-key marker wins over the overload markers. Overload markers are
/// compared case-insensitively.
pub fn classify_provider_error(text: &str) -> ErrorKind {
    if text.contains(INVALID_KEY_MARKER) {
        return ErrorKind::InvalidCredential;
    }

    let folded = text.to_lowercase();
    if OVERLOAD_MARKERS.iter().any(|m| folded.contains(m)) {
        return ErrorKind::Overloaded;
    }

    ErrorKind::Other
}
