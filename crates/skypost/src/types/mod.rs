//! Validated identifier types.
//!
//! These types enforce protocol invariants at construction time, so a
//! session or profile holding one never carries a malformed value.

mod did;
mod service_url;

pub use did::Did;
pub use service_url::ServiceUrl;
