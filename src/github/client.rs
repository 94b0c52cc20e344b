//! Client for the GitHub REST contents API.

use crate::config::FetchConfig;
use crate::error::{AnalysisError, Result};
use crate::github::{ContentItem, Fetched, FileContent, RepositoryHost, RepositoryRef};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "gitagent";

/// Client for the GitHub contents API
///
/// Every request shares one overall timeout taken from [`FetchConfig`]. No
/// request is retried; failures surface as [`Fetched::Absent`] or
/// [`Fetched::Denied`].
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client against `config.api_base`, authenticating with `token` when given
    pub fn new(config: &FetchConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        let api_base = Url::parse(&config.api_base)
            .map_err(|e| AnalysisError::Configuration(format!("Invalid GitHub API base '{}': {}", config.api_base, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(AnalysisError::Configuration(format!("Invalid GitHub API base '{}'", config.api_base)));
        }

        Ok(Self {
            client,
            api_base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Builds `{base}/repos/{owner}/{repo}/contents/{path}` with each segment escaped
    pub fn contents_url(&self, repo: &RepositoryRef, path: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    async fn get_contents(&self, repo: &RepositoryRef, path: &str) -> Fetched<Value> {
        let url = self.contents_url(repo, path);
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request for {} failed: {}", url, e);
                return Fetched::Absent;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Error retrieving {}: {} - {}", url, status, body.trim());
            return match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Fetched::Denied,
                _ => Fetched::Absent,
            };
        }

        match response.json::<Value>().await {
            Ok(value) => Fetched::Found(value),
            Err(e) => {
                warn!("Invalid JSON from {}: {}", url, e);
                Fetched::Absent
            }
        }
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn list_directory(&self, repo: &RepositoryRef, path: &str) -> Fetched<Vec<ContentItem>> {
        let value = match self.get_contents(repo, path).await {
            Fetched::Found(value) => value,
            Fetched::Absent => return Fetched::Absent,
            Fetched::Denied => return Fetched::Denied,
        };

        // A file path returns a single descriptor instead of an array
        let items = match value {
            Value::Array(_) => serde_json::from_value::<Vec<ContentItem>>(value),
            other => serde_json::from_value::<ContentItem>(other).map(|item| vec![item]),
        };

        match items {
            Ok(items) => Fetched::Found(items),
            Err(e) => {
                warn!("Unexpected listing format for {}/{}: {}", repo, path, e);
                Fetched::Absent
            }
        }
    }

    async fn fetch_file(&self, repo: &RepositoryRef, path: &str) -> Fetched<FileContent> {
        let value = match self.get_contents(repo, path).await {
            Fetched::Found(value) => value,
            Fetched::Absent => return Fetched::Absent,
            Fetched::Denied => return Fetched::Denied,
        };

        let Some(encoded) = value.get("content").and_then(Value::as_str) else {
            debug!("No content field for {}", path);
            return Fetched::Absent;
        };

        match decode_content(path, encoded) {
            Some(content) => Fetched::Found(content),
            None => Fetched::Absent,
        }
    }
}

/// Decodes a base64 `content` field from the contents API
///
/// Returns `None` when the payload is not valid base64 or decodes to
/// nothing. Bodies that are binary or not UTF-8 become the binary
/// placeholder.
pub fn decode_content(path: &str, encoded: &str) -> Option<FileContent> {
    // The API wraps the encoded body at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not decode content of {}: {}", path, e);
            return None;
        }
    };

    if bytes.is_empty() {
        return None;
    }

    if content_inspector::inspect(&bytes).is_binary() {
        return Some(FileContent::binary(path));
    }

    match String::from_utf8(bytes) {
        Ok(text) => Some(FileContent::Text(text)),
        Err(_) => Some(FileContent::binary(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> GitHubClient {
        let config = FetchConfig {
            api_base: base.to_string(),
            ..FetchConfig::default()
        };
        GitHubClient::new(&config, None).unwrap()
    }

    #[test]
    fn test_contents_url() {
        let client = client_with_base("https://api.github.com");
        let repo = RepositoryRef::parse("https://github.com/acme/widget").unwrap();

        assert_eq!(
            client.contents_url(&repo, "").as_str(),
            "https://api.github.com/repos/acme/widget/contents"
        );
        assert_eq!(
            client.contents_url(&repo, "src/my file.rs").as_str(),
            "https://api.github.com/repos/acme/widget/contents/src/my%20file.rs"
        );
    }

    #[test]
    fn test_contents_url_with_path_prefix() {
        let client = client_with_base("https://ghe.example.com/api/v3/");
        let repo = RepositoryRef::parse("https://github.com/acme/widget").unwrap();
        assert_eq!(
            client.contents_url(&repo, "README.md").as_str(),
            "https://ghe.example.com/api/v3/repos/acme/widget/contents/README.md"
        );
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let encoded = "Zm4gbWFpbigpIHt9\nCg==\n";
        assert_eq!(
            decode_content("main.rs", encoded),
            Some(FileContent::Text("fn main() {}\n".to_string()))
        );
    }

    #[test]
    fn test_decode_binary_and_invalid() {
        let encoded = STANDARD.encode([0u8, 159, 146, 150, 0, 1]);
        assert_eq!(
            decode_content("blob.bin", &encoded),
            Some(FileContent::binary("blob.bin"))
        );
        assert_eq!(decode_content("bad.txt", "***"), None);
        assert_eq!(decode_content("empty.txt", ""), None);
    }

    #[test]
    fn test_invalid_api_base_is_configuration_error() {
        let config = FetchConfig {
            api_base: "not a url".to_string(),
            ..FetchConfig::default()
        };
        assert!(matches!(
            GitHubClient::new(&config, None),
            Err(AnalysisError::Configuration(_))
        ));
    }
}
