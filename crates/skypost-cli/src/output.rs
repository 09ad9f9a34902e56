//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use skypost::Error;
use skypost::error::InvalidInputError;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// A one-line message for the user. Status codes and server internals are
/// left to the debug log.
pub fn describe(err: &Error) -> String {
    match err {
        Error::Network(_) => "Could not reach the service. Check your connection.".into(),
        Error::Cancelled => "Cancelled.".into(),
        Error::AuthenticationFailed { .. } => {
            "Login failed. Check your handle and app password.".into()
        }
        Error::NotAuthenticated => "Not logged in. Run 'skypost login' first.".into(),
        Error::ProfileFetchFailed { .. } => "Could not load the profile.".into(),
        Error::PostFailed { .. } => "The post was not published.".into(),
        Error::Decode(_) => "The service sent a response skypost does not understand.".into(),
        Error::InvalidInput(InvalidInputError::Empty { field }) => {
            format!("The {} must not be empty.", field)
        }
        Error::InvalidInput(e) => format!("Invalid input: {}", e),
        Error::Store(e) => format!("Could not access saved credentials: {}", e),
    }
}

/// Turn a client failure into the command's error. The full error goes to
/// the debug log.
pub fn failure(err: Error) -> anyhow::Error {
    tracing::debug!(error = %err, "Command failed");
    anyhow::anyhow!(describe(&err))
}
