//! Requirements files fetched over HTTP, directly or from a GitHub repository

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_RAW_URL, DEFAULT_REQUIREMENTS_FILE};
use crate::version::error::RegistryError;

/// Branch assumed when the repository's default branch cannot be looked up
const FALLBACK_BRANCH: &str = "master";

/// Response from the GitHub repository API
#[derive(Debug, Deserialize)]
struct Repository {
    default_branch: String,
}

/// Client for requirements files hosted on GitHub or any plain URL
pub struct RemoteClient {
    client: Client,
    api_url: String,
    raw_url: String,
}

impl Default for RemoteClient {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_RAW_URL)
    }
}

impl RemoteClient {
    pub fn new(api_url: &str, raw_url: &str) -> Self {
        Self::with_client(api_url, raw_url, Client::new())
    }

    /// Creates a client sharing an already configured HTTP client
    pub fn with_client(api_url: &str, raw_url: &str, client: Client) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            raw_url: raw_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the default branch of `repo`, or `master` when it cannot be determined
    pub async fn default_branch(&self, repo: &str) -> String {
        let url = format!("{}/repos/{}", self.api_url, repo);
        debug!("Looking up default branch: {}", url);

        let response = match self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("GitHub API returned status {}: {}", response.status(), url);
                return FALLBACK_BRANCH.to_string();
            }
            Err(e) => {
                warn!("Failed to look up default branch of {}: {}", repo, e);
                return FALLBACK_BRANCH.to_string();
            }
        };

        response
            .json::<Repository>()
            .await
            .map(|repository| repository.default_branch)
            .inspect_err(|e| warn!("Failed to parse GitHub repository response: {}", e))
            .unwrap_or_else(|_| FALLBACK_BRANCH.to_string())
    }

    /// Builds the raw file URL of a requirements file inside a GitHub repository
    ///
    /// `repo` may be `owner/name` or a full `https://github.com/owner/name` URL.
    /// Without a branch the repository's default branch is looked up.
    pub async fn build_github_url(
        &self,
        repo: &str,
        branch: Option<&str>,
        path: Option<&str>,
        token: Option<&str>,
    ) -> String {
        let repo = normalize_repo(repo);
        let path = path
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_REQUIREMENTS_FILE)
            .trim_start_matches('/');

        let branch = match branch.filter(|b| !b.is_empty()) {
            Some(branch) => branch.to_string(),
            None => self.default_branch(&repo).await,
        };

        let url = format!("{}/{}/{}/{}", self.raw_url, repo, branch, path);

        match token {
            Some(token) => format!("{url}?token={token}"),
            None => url,
        }
    }

    /// Fetches a requirements file. Anything but a 200 yields empty content.
    pub async fn fetch_requirements(&self, url: &str) -> Result<String, RegistryError> {
        let response = self.client.get(url).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            warn!("Fetching {} returned status {}", url, response.status());
            return Ok(String::new());
        }

        Ok(response.text().await?)
    }
}

/// Strip a leading `http(s)://github.com/` and surrounding slashes from a repository
pub fn normalize_repo(repo: &str) -> String {
    let github_prefix = Regex::new(r"^https?://github\.com/").unwrap();
    github_prefix
        .replace(repo.trim(), "")
        .trim_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use rstest::rstest;

    #[rstest]
    #[case("acme/webapp", "acme/webapp")]
    #[case("https://github.com/acme/webapp", "acme/webapp")]
    #[case("http://github.com/acme/webapp/", "acme/webapp")]
    #[case("/acme/webapp/", "acme/webapp")]
    fn normalize_repo_returns_expected(#[case] repo: &str, #[case] expected: &str) {
        assert_eq!(normalize_repo(repo), expected);
    }

    #[tokio::test]
    async fn build_github_url_with_branch_skips_lookup() {
        let client = RemoteClient::new("http://unused.localhost.test", "https://raw.example");

        let url = client
            .build_github_url("acme/webapp", Some("main"), None, None)
            .await;

        assert_eq!(url, "https://raw.example/acme/webapp/main/requirements.txt");
    }

    #[tokio::test]
    async fn build_github_url_looks_up_default_branch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/webapp")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"full_name": "acme/webapp", "default_branch": "master"}"#)
            .create_async()
            .await;

        let client = RemoteClient::new(&server.url(), "https://raw.example");
        let without_branch = client
            .build_github_url("https://github.com/acme/webapp", None, None, None)
            .await;
        let with_branch = client
            .build_github_url("acme/webapp", Some("master"), None, None)
            .await;

        mock.assert_async().await;
        assert_eq!(without_branch, with_branch);
    }

    #[tokio::test]
    async fn build_github_url_appends_path_and_token() {
        let client = RemoteClient::new("http://unused.localhost.test", "https://raw.example");

        let url = client
            .build_github_url("acme/webapp", Some("dev"), Some("/requirements/base.txt"), Some("abc"))
            .await;

        assert_eq!(
            url,
            "https://raw.example/acme/webapp/dev/requirements/base.txt?token=abc"
        );
    }

    #[tokio::test]
    async fn default_branch_falls_back_to_master_when_repo_is_missing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/nobody/nothing")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = RemoteClient::new(&server.url(), "https://raw.example");
        let branch = client.default_branch("nobody/nothing").await;

        mock.assert_async().await;
        assert_eq!(branch, "master");
    }

    #[tokio::test]
    async fn fetch_requirements_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/requirements.txt")
            .with_status(200)
            .with_body("requests==1.2.3\n")
            .create_async()
            .await;

        let client = RemoteClient::default();
        let content = client
            .fetch_requirements(&format!("{}/requirements.txt", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(content, "requests==1.2.3\n");
    }

    #[tokio::test]
    async fn fetch_requirements_returns_empty_content_for_missing_file() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/requirements.txt")
            .with_status(404)
            .create_async()
            .await;

        let client = RemoteClient::default();
        let content = client
            .fetch_requirements(&format!("{}/requirements.txt", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(content, "");
    }
}
