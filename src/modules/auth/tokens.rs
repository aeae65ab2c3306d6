use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::ROLE_PREFIX;

/// Standard alphabet, tolerant of the missing padding JWT segments carry
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the payload segment of a bearer token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// First role with the `ROLE_` prefix removed
    pub fn primary_role(&self) -> Option<String> {
        let role = self.roles.first()?;
        let stripped = role.strip_prefix(ROLE_PREFIX).unwrap_or(role);
        if stripped.is_empty() {
            None
        } else {
            Some(stripped.to_string())
        }
    }
}

/// Decode the claims of a three-segment token.
///
/// The signature is not verified; the server remains the authority on
/// validity. Any malformed input yields `None` and a warning.
pub fn decode(token: &str) -> Option<Claims> {
    match try_decode(token) {
        Ok(claims) => Some(claims),
        Err(reason) => {
            warn!("Could not decode token payload: {}", reason);
            None
        }
    }
}

fn try_decode(token: &str) -> Result<Claims, String> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(format!("expected 3 segments, found {}", segments.len()));
    }

    let normalized = segments[1].replace('-', "+").replace('_', "/");
    let bytes = PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| format!("invalid base64: {}", e))?;
    let text = String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))?;

    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("payload is not a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| format!("unexpected claim types: {}", e))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    /// Build an unsigned token whose payload is `payload` encoded base64url without padding
    pub(crate) fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_roles() {
        let token = make_token(r#"{"sub":"alice","roles":["ROLE_ADMIN","ROLE_CLIENTE"],"exp":1900000000}"#);
        let claims = decode(&token).unwrap();

        assert_eq!(claims.roles, vec!["ROLE_ADMIN", "ROLE_CLIENTE"]);
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(claims.primary_role().as_deref(), Some("ADMIN"));
    }

    #[test]
    fn test_decode_url_safe_characters() {
        // "???" and ">>>" encode to '_' and '-' in the URL-safe alphabet
        let token = make_token(r#"{"roles":["ROLE_CLIENTE"],"note":"???>>>"}"#);
        assert!(token.contains('_') || token.contains('-'));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.primary_role().as_deref(), Some("CLIENTE"));
    }

    #[test]
    fn test_decode_padded_payload() {
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"roles":["ROLE_X"]}"#);
        let token = format!("h.{}.s", body);
        assert_eq!(decode(&token).unwrap().roles, vec!["ROLE_X"]);
    }

    #[test]
    fn test_decode_utf8_payload() {
        let token = make_token(r#"{"sub":"José","roles":["ROLE_CONDUCTOR"]}"#);
        assert_eq!(decode(&token).unwrap().sub.as_deref(), Some("José"));
    }

    #[test]
    fn test_decode_without_roles() {
        let claims = decode(&make_token(r#"{"sub":"bob"}"#)).unwrap();
        assert!(claims.roles.is_empty());
        assert_eq!(claims.primary_role(), None);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("only-one-segment"), None);
        assert_eq!(decode("two.segments"), None);
        assert_eq!(decode("a.b.c.d"), None);
        assert_eq!(decode("header.%%%notbase64%%%.sig"), None);

        // Valid base64, but not JSON
        assert_eq!(decode(&make_token("plain text")), None);
        // JSON, but not an object
        assert_eq!(decode(&make_token(r#"["ROLE_ADMIN"]"#)), None);
        assert_eq!(decode(&make_token("42")), None);
        // Object with the wrong claim types
        assert_eq!(decode(&make_token(r#"{"roles":"ROLE_ADMIN"}"#)), None);

        // Not UTF-8
        let body = URL_SAFE_NO_PAD.encode([0xffu8, 0xfe, 0xfd]);
        assert_eq!(decode(&format!("h.{}.s", body)), None);
    }

    #[test]
    fn test_primary_role_prefix_handling() {
        let claims = Claims {
            roles: vec!["SUPERVISOR".to_string()],
            ..Claims::default()
        };
        assert_eq!(claims.primary_role().as_deref(), Some("SUPERVISOR"));

        let claims = Claims {
            roles: vec!["ROLE_".to_string()],
            ..Claims::default()
        };
        assert_eq!(claims.primary_role(), None);
    }
}
