//! Refresh command implementation.

use anyhow::Result;
use clap::Args;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, client: &Client) -> Result<()> {
    let session = client.refresh_session().await.map_err(output::failure)?;

    output::success("Session refreshed");
    output::field("Handle", session.handle());
    output::field("DID", session.user_id().as_str());

    Ok(())
}
