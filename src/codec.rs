//! Transform engine: tagged base64 encode/decode and encoded-text detection.
//!
//! The tag prefix and the standard base64 alphabet are the bot's only wire
//! format. Any change breaks round-trip compatibility with text encoded by
//! earlier deployments, so both are fixed here and nowhere else.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Prefix marking text as produced by [`encode`].
pub const TAG: &str = "VX_ENCRYPTED:";

/// Sentinel shown to the user when decoding fails for any reason.
pub const DECODE_ERROR_TEXT: &str = "Error: This doesn't appear to be a valid encrypted text.";

/// Why a candidate string could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid standard base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// The payload decoded, but not to UTF-8 text.
    #[error("decoded payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encode `plaintext` as the tag followed by standard base64.
///
/// Total function: succeeds for every string, including the empty one.
#[must_use]
pub fn encode(plaintext: &str) -> String {
    format!("{TAG}{}", STANDARD.encode(plaintext.as_bytes()))
}

/// Decode `candidate`, stripping the tag first if present.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the payload is not valid base64 or the
/// decoded bytes are not valid UTF-8.
pub fn try_decode(candidate: &str) -> Result<String, DecodeError> {
    let payload = candidate.strip_prefix(TAG).unwrap_or(candidate);
    let bytes = STANDARD.decode(payload)?;
    Ok(String::from_utf8(bytes)?)
}

/// Error-as-value decode for the chat surface.
///
/// Failures collapse to [`DECODE_ERROR_TEXT`] instead of propagating;
/// the user pasted something, they get an answer either way.
#[must_use]
pub fn decode(candidate: &str) -> String {
    try_decode(candidate).unwrap_or_else(|_| DECODE_ERROR_TEXT.to_string())
}

/// Heuristic check for text that was (probably) produced by [`encode`].
///
/// True when the text carries the tag, or when every character is in the
/// standard base64 alphabet and the length is a nonzero multiple of 4.
/// The fallback is deliberately permissive: short alphanumeric words like
/// "test" match it. That false positive is long-standing user-visible
/// behavior and must not be tightened to a tag-only check.
#[must_use]
pub fn looks_encoded(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.starts_with(TAG) {
        return true;
    }
    text.len() % 4 == 0
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}
