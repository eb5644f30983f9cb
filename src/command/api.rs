use crate::error::Result;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.papermc.io/v2/projects/paper";

/// Thin client over the PaperMC v2 project API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    endpoint: Url,
}

impl ApiClient {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("papermc-helper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();

        // http(s) endpoints always have a hierarchical path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        debug!("GET {url}");

        let response = self.client.get(url).send().await?.error_for_status()?;

        Ok(response)
    }
}

pub fn parse_endpoint(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid endpoint '{value}': {e}"))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("endpoint scheme not supported: {}", url.scheme()));
    }

    Ok(url)
}
