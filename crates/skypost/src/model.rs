//! Profile and post types exchanged with callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Did;
use crate::xrpc::{POST_COLLECTION, PostRecord};

/// An account profile as returned by `app.bsky.actor.getProfile`.
///
/// `user_id` and `handle` are required; the descriptive fields are `None`
/// when the account has not set them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The account DID.
    #[serde(rename = "did")]
    pub user_id: Did,

    /// The account handle.
    pub handle: String,

    /// Display name chosen by the user.
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// URL of the avatar image.
    #[serde(rename = "avatar", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Free-form profile description.
    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Profile {
    /// The name to show for this account: display name if set, else handle.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.handle)
    }
}

/// A post about to be submitted.
#[derive(Debug, Clone)]
pub struct PostDraft {
    /// Post body.
    pub text: String,
    /// Creation time, stamped when the draft is built.
    pub created_at: DateTime<Utc>,
    /// The author's DID; also the target repository.
    pub author_id: Did,
}

impl PostDraft {
    /// Build a draft stamped with the current time.
    pub fn new(text: impl Into<String>, author_id: Did) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
            author_id,
        }
    }

    /// `createdAt` in the form the service expects, e.g.
    /// `2025-02-21T12:00:00.000Z`.
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub(crate) fn record(&self) -> PostRecord<'_> {
        PostRecord {
            record_type: POST_COLLECTION,
            text: &self.text,
            created_at: self.created_at_rfc3339(),
        }
    }
}
