use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs::{read_to_string, write};

pub const EULA_FILE: &str = "eula.txt";
pub const EULA_ACCEPTED: &str = "eula=true";

pub fn get_eula_path(directory: &Path) -> PathBuf {
    directory.join(EULA_FILE)
}

/// Writes the accepted EULA marker into `directory`, replacing any previous
/// contents.
pub async fn accept_eula(directory: &Path) -> Result<PathBuf> {
    let path = get_eula_path(directory);

    write(&path, EULA_ACCEPTED)
        .await
        .map_err(|source| Error::Filesystem {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

pub async fn is_eula_accepted(directory: &Path) -> bool {
    match read_to_string(get_eula_path(directory)).await {
        Ok(contents) => contents == EULA_ACCEPTED,
        Err(_) => false,
    }
}
