//! Whoami command implementation.

use anyhow::Result;
use clap::Args;
use skypost::Error;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

/// Reads the stored session only; no request is made.
pub fn run(_args: WhoamiArgs, client: &Client) -> Result<()> {
    let session = client
        .current_session()
        .map_err(output::failure)?
        .ok_or(Error::NotAuthenticated)
        .map_err(output::failure)?;

    output::field("Handle", session.handle());
    output::field("DID", session.user_id().as_str());
    output::field("Service", session.service().as_str());

    Ok(())
}
