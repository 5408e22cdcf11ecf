//! Time-based one-time passwords (RFC 6238: HMAC-SHA1, 6 digits, 30 s step),
//! compatible with common authenticator apps.

use data_encoding::BASE32_NOPAD;
use rand::Rng;
use totp_lite::{Sha1, totp_custom};

use crate::constants::totp::{DIGITS, SECRET_BYTES, STEP_SECONDS};

/// Generate a random secret, base32 encoded without padding.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill(&mut bytes[..]);
    BASE32_NOPAD.encode(&bytes)
}

/// Decode a base32 secret. Tolerates lowercase, spaces and `=` padding, as
/// users sometimes copy secrets by hand.
fn decode_secret(secret: &str) -> Option<Vec<u8>> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.is_empty() {
        return None;
    }

    BASE32_NOPAD.decode(normalized.as_bytes()).ok()
}

/// The code valid for the step containing `unix_time`, or `None` if the
/// secret is not valid base32.
#[must_use]
pub fn code_at(secret: &str, unix_time: u64) -> Option<String> {
    let key = decode_secret(secret)?;
    Some(totp_custom::<Sha1>(STEP_SECONDS, DIGITS, &key, unix_time))
}

/// Check `code` against the step containing `unix_time`, plus `skew_steps`
/// steps on either side.
#[must_use]
pub fn verify_at(secret: &str, code: &str, unix_time: u64, skew_steps: u8) -> bool {
    let code = code.trim();
    if code.len() != DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let Some(key) = decode_secret(secret) else {
        return false;
    };

    let skew = i64::from(skew_steps);
    (-skew..=skew).any(|offset| {
        let Some(time) = unix_time.checked_add_signed(offset * STEP_SECONDS as i64) else {
            return false;
        };
        let expected = totp_custom::<Sha1>(STEP_SECONDS, DIGITS, &key, time);
        constant_time_eq(expected.as_bytes(), code.as_bytes())
    })
}

/// Check `code` against the current time.
#[must_use]
pub fn verify_now(secret: &str, code: &str, skew_steps: u8) -> bool {
    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
    verify_at(secret, code, now, skew_steps)
}

/// `otpauth://` URI for enrolling the secret in an authenticator app.
#[must_use]
pub fn provisioning_uri(secret: &str, account: &str, issuer: &str) -> String {
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}&algorithm=SHA1&digits={}&period={}",
        urlencoding::encode(issuer),
        urlencoding::encode(account),
        secret,
        urlencoding::encode(issuer),
        DIGITS,
        STEP_SECONDS
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
