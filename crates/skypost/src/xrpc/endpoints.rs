//! XRPC endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};

use crate::types::Did;

// ============================================================================
// Endpoint Names
// ============================================================================

/// com.atproto.server.createSession
pub const CREATE_SESSION: &str = "com.atproto.server.createSession";

/// com.atproto.server.refreshSession
pub const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";

/// app.bsky.actor.getProfile
pub const GET_PROFILE: &str = "app.bsky.actor.getProfile";

/// com.atproto.repo.createRecord
pub const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// Collection (and record `$type`) for feed posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for createSession.
#[derive(Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response from createSession.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub did: Did,
    pub handle: String,
    pub access_jwt: String,
    #[serde(default)]
    pub refresh_jwt: Option<String>,
}

/// Response from refreshSession.
/// refreshSession takes no request body; the refresh token is the bearer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionResponse {
    pub did: Did,
    pub handle: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

/// Request body for createRecord.
#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a, R> {
    pub repo: &'a str,
    pub collection: &'a str,
    pub record: R,
}

/// The `app.bsky.feed.post` record value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub record_type: &'a str,
    pub text: &'a str,
    pub created_at: String,
}

/// XRPC error response format.
#[derive(Debug, Deserialize)]
pub struct XrpcErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_record_uses_wire_names() {
        let request = CreateRecordRequest {
            repo: "did:plc:abc",
            collection: POST_COLLECTION,
            record: PostRecord {
                record_type: POST_COLLECTION,
                text: "hello",
                created_at: "2025-02-21T12:00:00.000Z".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["repo"], "did:plc:abc");
        assert_eq!(value["collection"], "app.bsky.feed.post");
        assert_eq!(value["record"]["$type"], "app.bsky.feed.post");
        assert_eq!(value["record"]["text"], "hello");
        assert_eq!(value["record"]["createdAt"], "2025-02-21T12:00:00.000Z");
    }

    #[test]
    fn session_response_tolerates_missing_refresh_token() {
        let response: CreateSessionResponse = serde_json::from_str(
            r#"{"accessJwt":"tok","did":"did:plc:abc","handle":"alice.test","active":true}"#,
        )
        .unwrap();
        assert_eq!(response.access_jwt, "tok");
        assert!(response.refresh_jwt.is_none());
    }
}
