use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::approval::action::ApprovalAction;

type HmacSha256 = Hmac<Sha256>;

/// Encode (subject, action, expiry) for signing. Each field is
/// length-prefixed (u32 big-endian), so field boundaries are unambiguous
/// even if a future identifier could contain a delimiter character.
pub fn signing_message(subject: &Uuid, action: ApprovalAction, expires_at_ms: i64) -> Vec<u8> {
    let expiry = expires_at_ms.to_string();
    let fields: [&[u8]; 3] = [
        subject.as_bytes(),
        action.as_str().as_bytes(),
        expiry.as_bytes(),
    ];

    let mut out = Vec::with_capacity(64);
    for field in fields {
        out.extend_from_slice(&(field.len() as u32).to_be_bytes());
        out.extend_from_slice(field);
    }
    out
}

/// Compute the keyed integrity tag over a message, as lowercase hex.
/// Pure: same message and secret always yield the same tag.
pub fn sign(message: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a supplied hex tag against the expected one.
///
/// Returns `false` (never errors) on malformed hex, length mismatch, or
/// tag mismatch. The comparison runs in constant time so response timing
/// leaks nothing about where the first wrong byte sits. This is the one
/// cryptographically binding check in the whole flow.
pub fn verify(message: &[u8], secret: &[u8], supplied_hex: &str) -> bool {
    let Ok(supplied) = hex::decode(supplied_hex) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    mac.verify_slice(&supplied).is_ok()
}
