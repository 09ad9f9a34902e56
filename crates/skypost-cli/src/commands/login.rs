//! Login command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use skypost::Credentials;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Handle, email or DID to log in with
    pub identifier: String,

    /// App password
    #[arg(long, env = "SKYPOST_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client: &Client) -> Result<()> {
    let credentials = Credentials::new(&args.identifier, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let session = client
        .authenticate(credentials)
        .await
        .map_err(output::failure)?;

    output::success("Logged in successfully");
    println!();
    output::field("Handle", session.handle());
    output::field("DID", session.user_id().as_str());
    output::field("Service", session.service().as_str());

    Ok(())
}
