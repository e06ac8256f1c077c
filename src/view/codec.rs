//! URL parameter codec: base64 of the JSON-encoded view state.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use super::state::ViewState;

/// Why a view parameter could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("view state is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid view state JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn encode_view_state(state: &ViewState) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(state)?;
    Ok(STANDARD.encode(json))
}

/// Decode a `view` parameter.
///
/// Form decoding turns `+` into a space; those are put back before decoding.
pub fn decode_view_state(param: &str) -> Result<ViewState, DecodeError> {
    let cleaned = param.trim().replace(' ', "+");
    let bytes = STANDARD.decode(cleaned)?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}
