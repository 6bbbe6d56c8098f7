use async_trait::async_trait;
use gover_backend::{BackendError, Catalog, ToolchainVersion};
use serde::Deserialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Deserialize)]
struct Release {
    version: String,
    #[serde(default)]
    stable: bool,
    #[serde(default)]
    files: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReleaseFile {
    filename: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    arch: String,
    #[serde(default)]
    kind: String,
}

/// Client for the `go.dev/dl` JSON index.
pub struct GoDevCatalog {
    client: reqwest::Client,
    base_url: String,
    os: String,
    arch: String,
}

impl GoDevCatalog {
    /// `base_url` is the download page (`https://go.dev/dl/`); archives are
    /// resolved relative to it.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: ensure_trailing_slash(base_url),
            os: go_os(std::env::consts::OS).to_string(),
            arch: go_arch(std::env::consts::ARCH).to_string(),
        }
    }

    #[must_use]
    pub fn with_platform(mut self, os: &str, arch: &str) -> Self {
        self.os = os.to_string();
        self.arch = arch.to_string();
        self
    }

    fn index_url(&self) -> String {
        format!("{}?mode=json&include=all", self.base_url)
    }

    async fn fetch_releases(&self, operation: &'static str) -> Result<Vec<Release>, BackendError> {
        let url = self.index_url();
        log::debug!("Fetching release index from {url}");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "gover")
            .send()
            .await
            .map_err(|e| BackendError::network_request_from(operation, e))?;

        if !response.status().is_success() {
            return Err(BackendError::network_request(
                operation,
                format!("HTTP {} from {url}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network_request_from(operation, e))?;
        parse_releases(&body).map_err(|e| BackendError::network_parse_from(operation, e))
    }
}

#[async_trait]
impl Catalog for GoDevCatalog {
    async fn list_remote(&self, include_unstable: bool) -> Result<Vec<String>, BackendError> {
        let releases = self.fetch_releases("list remote versions").await?;
        Ok(version_list(&releases, include_unstable))
    }

    async fn download_url(&self, version: &str) -> Result<String, BackendError> {
        let releases = self.fetch_releases("resolve download url").await?;
        archive_url(&releases, &self.base_url, version, &self.os, &self.arch)
    }
}

fn parse_releases(body: &str) -> Result<Vec<Release>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Identifiers without the `go` prefix, newest first.
fn version_list(releases: &[Release], include_unstable: bool) -> Vec<String> {
    let mut versions: Vec<(String, Option<ToolchainVersion>)> = releases
        .iter()
        .filter(|release| include_unstable || release.stable)
        .map(|release| {
            let id = release
                .version
                .strip_prefix("go")
                .unwrap_or(&release.version)
                .to_string();
            let parsed = id.parse().ok();
            (id, parsed)
        })
        .collect();

    versions.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    versions.into_iter().map(|(id, _)| id).collect()
}

fn archive_url(
    releases: &[Release],
    base_url: &str,
    version: &str,
    os: &str,
    arch: &str,
) -> Result<String, BackendError> {
    let wanted = format!("go{version}");
    let release = releases
        .iter()
        .find(|release| release.version == wanted)
        .ok_or_else(|| BackendError::VersionNotFound {
            version: version.to_string(),
        })?;

    release
        .files
        .iter()
        .find(|file| file.kind == "archive" && file.os == os && file.arch == arch)
        .map(|file| format!("{base_url}{}", file.filename))
        .ok_or_else(|| BackendError::NoDownloadAvailable {
            version: version.to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn go_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "armv6l",
        "powerpc64" => "ppc64le",
        other => other,
    }
}
