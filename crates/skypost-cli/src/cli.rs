//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, post, profile, refresh, whoami};

/// Post to Bluesky from the terminal.
#[derive(Parser, Debug)]
#[command(name = "skypost")]
#[command(author, version = env!("SKYPOST_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and storage settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Service base URL
    #[arg(long, global = true, env = "SKYPOST_SERVICE", default_value = "https://bsky.social")]
    pub service: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SKYPOST_TIMEOUT", default_value_t = 15)]
    pub timeout: u64,

    /// Retries for profile lookups on network errors
    #[arg(long, global = true, env = "SKYPOST_RETRIES", default_value_t = 0)]
    pub retries: u32,

    /// Credentials file (defaults to the platform data directory)
    #[arg(long, global = true, env = "SKYPOST_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the session
    Login(login::LoginArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Show the stored session
    Whoami(whoami::WhoamiArgs),

    /// Show a profile (your own by default)
    Profile(profile::ProfileArgs),

    /// Publish a text post
    Post(post::PostArgs),

    /// Exchange the refresh token for a new session
    Refresh(refresh::RefreshArgs),
}
