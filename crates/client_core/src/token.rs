//! Reads the display name out of a session token's payload segment.
//!
//! The signature is not checked here. The result is only fit for showing in
//! the header; it must never gate access to anything.

use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde_json::Value;
use tracing::debug;

pub const NAME_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
const SHORT_NAME_CLAIM: &str = "name";

/// Returns `None` for anything that is not a three-part token whose payload
/// is a JSON object carrying a non-empty name claim.
pub fn extract_display_name(token: &str) -> Option<String> {
    let claims = decode_claims(token)?;
    [NAME_CLAIM, SHORT_NAME_CLAIM]
        .into_iter()
        .filter_map(|claim| claims.get(claim).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn decode_claims(token: &str) -> Option<serde_json::Map<String, Value>> {
    let mut segments = token.trim().split('.');
    let (_header, payload) = (segments.next()?, segments.next()?);
    if payload.is_empty() || segments.next().is_none() {
        debug!("token: not a three-part token");
        return None;
    }

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|err| debug!("token: payload is not base64: {err}"))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) => None,
        Err(err) => {
            debug!("token: payload is not json: {err}");
            None
        }
    }
}
