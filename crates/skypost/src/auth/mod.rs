//! Authentication types.
//!
//! [`Credentials`] go in, an [`AuthSession`] comes out. Both hide their
//! secrets from `Debug` output so they can be passed to tracing spans safely.

mod credentials;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use session::AuthSession;
pub use tokens::{AccessToken, RefreshToken};
