//! JSON encoding and decoding of request and response bodies.
//!
//! Decoding ignores unknown fields so new server-side fields never break the
//! client, and treats absent optional fields as `None`. Missing required
//! fields and type mismatches surface as [`DecodeError`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::error::{DecodeError, InvalidInputError};

/// Field names whose values must never reach a log line.
const SENSITIVE_FIELDS: &[&str] = &["accessJwt", "refreshJwt", "password", "token"];

/// Serialize a request body to compact JSON.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        InvalidInputError::Other {
            message: format!("failed to encode request body: {}", e),
        }
        .into()
    })
}

/// Deserialize a response body, naming the expected `shape` on failure.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], shape: &'static str) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError {
        shape,
        details: e.to_string(),
    })
}

/// Render a body for trace logging with credentials masked.
pub fn redacted(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut value) => {
            mask(&mut value);
            value.to_string()
        }
        Err(_) => format!("<{} bytes>", bytes.len()),
    }
}

fn mask(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("[REDACTED]".to_string());
                } else {
                    mask(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Profile;
    use crate::types::Did;

    #[test]
    fn profile_without_optional_fields_decodes() {
        let body = br#"{"did":"did:plc:abc","handle":"alice.bsky.social"}"#;
        let profile: Profile = decode(body, "profile").unwrap();
        assert_eq!(profile.user_id.as_str(), "did:plc:abc");
        assert_eq!(profile.handle, "alice.bsky.social");
        assert!(profile.display_name.is_none());
        assert!(profile.avatar_url.is_none());
        assert!(profile.bio.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = br#"{"did":"did:plc:abc","handle":"alice.test","followersCount":12,"labels":[]}"#;
        assert!(decode::<Profile>(body, "profile").is_ok());
    }

    #[test]
    fn missing_required_field_is_a_decode_error() {
        let body = br#"{"handle":"alice.test","displayName":"Alice"}"#;
        let err = decode::<Profile>(body, "profile").unwrap_err();
        assert_eq!(err.shape, "profile");
        assert!(err.details.contains("did"));
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        let body = br#"{"did":"did:plc:abc","handle":42}"#;
        assert!(decode::<Profile>(body, "profile").is_err());
    }

    #[test]
    fn full_profile_survives_encode_and_decode() {
        let profile = Profile {
            user_id: Did::new("did:plc:abc").unwrap(),
            handle: "alice.bsky.social".to_string(),
            display_name: Some("Alice".to_string()),
            avatar_url: Some("https://cdn.bsky.app/img/avatar/alice.jpg".to_string()),
            bio: Some("hello".to_string()),
        };
        let bytes = encode(&profile).unwrap();
        let wire: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(wire["displayName"], "Alice");
        assert_eq!(wire["description"], "hello");

        let decoded: Profile = decode(&bytes, "profile").unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn redaction_masks_tokens_and_passwords() {
        let body = br#"{"accessJwt":"tok123","refreshJwt":"ref456","did":"did:plc:abc","nested":{"password":"hunter2"}}"#;
        let rendered = redacted(body);
        assert!(!rendered.contains("tok123"));
        assert!(!rendered.contains("ref456"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("did:plc:abc"));
    }

    #[test]
    fn redaction_of_non_json_reports_length() {
        assert_eq!(redacted(b"Internal Server Error"), "<21 bytes>");
    }
}
