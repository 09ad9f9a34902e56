//! Post command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Args;

use super::Client;
use crate::output;

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Post text (use - to read from stdin)
    pub text: String,
}

pub async fn run(args: PostArgs, client: &Client) -> Result<()> {
    let text = if args.text == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf.trim_end().to_string()
    } else {
        args.text
    };

    client.create_post(&text).await.map_err(output::failure)?;

    output::success("Posted");
    Ok(())
}
