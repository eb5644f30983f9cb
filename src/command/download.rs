use crate::{
    command::{api::ApiClient, release::BuildDescriptor},
    error::{Error, Result},
};
use std::path::Path;
use tokio::{fs::File, io::AsyncWriteExt};
use url::Url;

pub fn artifact_url(api: &ApiClient, descriptor: &BuildDescriptor) -> Url {
    let build = descriptor.build.to_string();

    api.url(&[
        "versions",
        &descriptor.version,
        "builds",
        &build,
        "downloads",
        &descriptor.download,
    ])
}

/// Streams the build's application jar into `destination`, replacing any
/// existing file. Returns the number of bytes written.
pub async fn download_artifact(
    api: &ApiClient,
    descriptor: &BuildDescriptor,
    destination: &Path,
) -> Result<u64> {
    let mut response = api.get(artifact_url(api, descriptor)).await?;

    let filesystem = |source: std::io::Error| Error::Filesystem {
        path: destination.to_path_buf(),
        source,
    };

    let mut file = File::create(destination).await.map_err(filesystem)?;
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(filesystem)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(filesystem)?;

    Ok(written)
}
