//! Location of the credentials file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use skypost::FileStore;

const STORE_FILE: &str = "credentials.json";

/// Open the credentials file at `path`, or in the platform data directory.
pub fn open(path: Option<PathBuf>) -> Result<FileStore> {
    let path = match path {
        Some(path) => path,
        None => default_path()?,
    };
    tracing::debug!(path = %path.display(), "Using credentials file");
    Ok(FileStore::new(path))
}

fn default_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "skypost").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join(STORE_FILE))
}
