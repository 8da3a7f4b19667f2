//! Inspection of the locally retained credential artifact.
//!
//! The artifact is a JWT-shaped string. Only its payload is read, and only
//! for the `exp` claim; the server's cookie session stays the sole source of
//! truth for whether the user is signed in.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::{ClientError, ClientResult};

/// Outcome of checking an artifact against the wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Not expired. `expires_at` is `None` when the token carries no `exp`.
    Valid { expires_at: Option<i64> },
    Expired { expired_at: i64 },
    Malformed { reason: String },
}

impl ArtifactStatus {
    /// Whether the artifact should be deleted.
    pub fn should_discard(&self) -> bool {
        !matches!(self, Self::Valid { .. })
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Decode the `exp` claim (seconds since the epoch) from a token.
pub fn decode_expiry(token: &str) -> ClientResult<Option<i64>> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(ClientError::malformed_artifact(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    }

    let payload = parts[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|e| ClientError::malformed_artifact(format!("payload is not base64: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::malformed_artifact(format!("payload is not JSON: {e}")))?;

    Ok(claims.exp.map(|exp| exp as i64))
}

/// Check a token against `now`.
pub fn inspect_at(token: &str, now: OffsetDateTime) -> ArtifactStatus {
    match decode_expiry(token) {
        Ok(Some(exp)) if now.unix_timestamp() >= exp => ArtifactStatus::Expired { expired_at: exp },
        Ok(expires_at) => ArtifactStatus::Valid { expires_at },
        Err(err) => ArtifactStatus::Malformed {
            reason: err.to_string(),
        },
    }
}

/// Check a token against the current wall clock.
pub fn inspect(token: &str) -> ArtifactStatus {
    inspect_at(token, OffsetDateTime::now_utc())
}

#[cfg(test)]
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_expired_token() {
        let token = make_token(&json!({ "sub": 1, "exp": 1_700_000_000 }));
        let status = inspect_at(&token, datetime!(2024-01-01 0:00 UTC));
        assert_eq!(
            status,
            ArtifactStatus::Expired {
                expired_at: 1_700_000_000
            }
        );
        assert!(status.should_discard());
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let token = make_token(&json!({ "exp": 1_700_000_000 }));
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert!(inspect_at(&token, at).should_discard());
        let before = OffsetDateTime::from_unix_timestamp(1_699_999_999).unwrap();
        assert!(!inspect_at(&token, before).should_discard());
    }

    #[test]
    fn test_token_without_expiry_is_kept() {
        let token = make_token(&json!({ "sub": 1 }));
        assert_eq!(
            inspect(&token),
            ArtifactStatus::Valid { expires_at: None }
        );
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            inspect("abc"),
            ArtifactStatus::Malformed { .. }
        ));
        assert!(matches!(
            inspect("a.!!!.c"),
            ArtifactStatus::Malformed { .. }
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("hello"));
        assert!(matches!(
            inspect(&not_json),
            ArtifactStatus::Malformed { .. }
        ));
    }

    #[test]
    fn test_padded_standard_payload() {
        let payload = base64::engine::general_purpose::STANDARD.encode(r#"{"exp":4102444800}"#);
        let token = format!("h.{payload}.s");
        assert_eq!(decode_expiry(&token).unwrap(), Some(4_102_444_800));
    }
}
