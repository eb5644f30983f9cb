use crate::{
    command::api::ApiClient,
    error::{Error, Result},
};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Default,
    Experimental,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Default => write!(f, "default"),
            Channel::Experimental => write!(f, "experimental"),
        }
    }
}

/// Which builds are eligible when picking the latest one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Only builds published on the given channel.
    Channel(Channel),
    /// Every build of the family, whatever its channel.
    AnyChannel,
}

impl Selection {
    fn admits(&self, build: &BuildDescriptor) -> bool {
        match self {
            Selection::Channel(channel) => build.channel == *channel,
            Selection::AnyChannel => true,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Channel(channel) => write!(f, "{channel} channel"),
            Selection::AnyChannel => write!(f, "any channel"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub version: String,
    pub build: u32,
    pub channel: Channel,
    pub download: String,
}

#[derive(Deserialize)]
struct VersionGroupBuilds {
    builds: Vec<VersionGroupBuild>,
}

#[derive(Deserialize)]
struct VersionGroupBuild {
    version: String,
    build: u32,
    channel: Channel,
    downloads: BuildDownloads,
}

#[derive(Deserialize)]
struct BuildDownloads {
    application: BuildDownload,
}

#[derive(Deserialize)]
struct BuildDownload {
    name: String,
}

impl From<VersionGroupBuild> for BuildDescriptor {
    fn from(build: VersionGroupBuild) -> Self {
        Self {
            version: build.version,
            build: build.build,
            channel: build.channel,
            download: build.downloads.application.name,
        }
    }
}

pub fn parse_builds(body: &str) -> Result<Vec<BuildDescriptor>> {
    let response = serde_json::from_str::<VersionGroupBuilds>(body)?;

    Ok(response.builds.into_iter().map(BuildDescriptor::from).collect())
}

pub async fn fetch_builds(api: &ApiClient, family: &str) -> Result<Vec<BuildDescriptor>> {
    let url = api.url(&["version_group", family, "builds"]);
    let body = api.get(url).await?.text().await?;
    let builds = parse_builds(&body)?;

    debug!("version group {family}: {} builds", builds.len());

    Ok(builds)
}

/// Picks one build out of `builds`.
///
/// An explicit build number is looked up across the whole list; otherwise the
/// highest build number among the builds admitted by `selection` wins.
pub fn select_build(
    builds: Vec<BuildDescriptor>,
    selection: Selection,
    explicit_build: Option<u32>,
) -> Result<BuildDescriptor> {
    let selected = match explicit_build {
        Some(number) => builds
            .into_iter()
            .find(|build| build.build == number)
            .ok_or_else(|| Error::NotFound(format!("build #{number} not found")))?,

        None => builds
            .into_iter()
            .filter(|build| selection.admits(build))
            .max_by_key(|build| build.build)
            .ok_or_else(|| Error::NotFound(format!("no builds found on {selection}")))?,
    };

    if selected.channel == Channel::Experimental {
        warn!("using experimental build #{}", selected.build);
    }

    Ok(selected)
}

pub async fn query_build(
    api: &ApiClient,
    family: &str,
    selection: Selection,
    explicit_build: Option<u32>,
) -> Result<BuildDescriptor> {
    let builds = fetch_builds(api, family).await?;

    select_build(builds, selection, explicit_build).map_err(|err| match err {
        Error::NotFound(message) => Error::NotFound(format!("{message} for version {family}")),
        err => err,
    })
}
