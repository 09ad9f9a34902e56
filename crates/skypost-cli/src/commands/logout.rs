//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, client: &Client) -> Result<()> {
    let was_logged_in = client.is_logged_in().map_err(output::failure)?;
    client.logout().map_err(output::failure)?;

    if was_logged_in {
        output::success("Logged out");
    } else {
        output::success("No session to remove");
    }

    Ok(())
}
