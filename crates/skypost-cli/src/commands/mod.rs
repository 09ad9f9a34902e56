//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod post;
pub mod profile;
pub mod refresh;
pub mod whoami;

use std::time::Duration;

use anyhow::{Context, Result};
use skypost::{ApiClient, ClientConfig, FileStore, HttpTransport, RetryPolicy, ServiceUrl};

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::output;
use crate::store;

/// The client every command runs against.
pub type Client = ApiClient<HttpTransport, FileStore>;

pub async fn handle(cli: Cli) -> Result<()> {
    let client = build_client(&cli.global)?;

    // Ctrl-C cancels whatever request is in flight.
    let cancel = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Login(args) => login::run(args, &client).await,
        Commands::Logout(args) => logout::run(args, &client),
        Commands::Whoami(args) => whoami::run(args, &client),
        Commands::Profile(args) => profile::run(args, &client).await,
        Commands::Post(args) => post::run(args, &client).await,
        Commands::Refresh(args) => refresh::run(args, &client).await,
    }
}

fn build_client(global: &GlobalArgs) -> Result<Client> {
    let service = ServiceUrl::new(&global.service).context("Invalid service URL")?;
    let config = ClientConfig::new(service)
        .with_timeout(Duration::from_secs(global.timeout))
        .with_retry(RetryPolicy::retries(global.retries));

    let store = store::open(global.store.clone())?;
    ApiClient::connect(config, store).map_err(output::failure)
}
