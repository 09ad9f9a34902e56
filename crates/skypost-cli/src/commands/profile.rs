//! Profile command implementation.

use anyhow::Result;
use clap::Args;
use skypost::Error;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Handle or DID to look up (defaults to the logged-in account)
    pub actor: Option<String>,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ProfileArgs, client: &Client) -> Result<()> {
    let actor = match args.actor {
        Some(actor) => actor,
        None => client
            .current_session()
            .map_err(output::failure)?
            .ok_or(Error::NotAuthenticated)
            .map_err(output::failure)?
            .handle()
            .to_string(),
    };

    let profile = client
        .fetch_profile(&actor)
        .await
        .map_err(output::failure)?;

    if args.json {
        return output::json_pretty(&profile);
    }

    output::field("Name", profile.name());
    output::field("Handle", &profile.handle);
    output::field("DID", profile.user_id.as_str());
    if let Some(avatar) = &profile.avatar_url {
        output::field("Avatar", avatar);
    }
    if let Some(bio) = &profile.bio {
        println!();
        println!("{}", bio);
    }

    Ok(())
}
