//! Skill download through the GitHub contents API.

use crate::record::record_address;
use crate::stop::StopFlag;
use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use skillbridge_sync::{parse_legacy_tree_url, DESCRIPTOR_FILE};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

const GITHUB_API_BASE: &str = "https://api.github.com";
const CLIENT_USER_AGENT: &str = concat!("skillbridge/", env!("CARGO_PKG_VERSION"));

/// Get the GitHub API base URL, allowing override for testing.
fn github_api_base() -> String {
    std::env::var("GITHUB_API_BASE_URL").unwrap_or_else(|_| GITHUB_API_BASE.to_string())
}

fn github_token() -> Option<String> {
    let raw = std::env::var("GITHUB_TOKEN").ok()?;
    let token = raw.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn apply_github_auth(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match github_token() {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// One entry of a contents API listing.
#[derive(Debug, Clone, Deserialize)]
struct ContentItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// The contents API returns an object instead of an array for a file path.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Many(Vec<ContentItem>),
    One(ContentItem),
}

impl Listing {
    fn into_items(self) -> Vec<ContentItem> {
        match self {
            Listing::Many(items) => items,
            Listing::One(item) if item.kind == "file" => vec![item],
            Listing::One(_) => Vec::new(),
        }
    }
}

/// Progress notifications emitted while downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    SkillFound { name: String, path: PathBuf },
    DirCreated(PathBuf),
    FileStarted(PathBuf),
    FileDone(PathBuf),
    Failed { url: String, message: String },
}

impl fmt::Display for DownloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkillFound { name, path } => {
                write!(f, "found skill {name} -> {}", path.display())
            }
            Self::DirCreated(path) => write!(f, "created {}", path.display()),
            Self::FileStarted(path) => write!(f, "downloading {}", path.display()),
            Self::FileDone(path) => write!(f, "downloaded {}", path.display()),
            Self::Failed { url, message } => write!(f, "failed {url}: {message}"),
        }
    }
}

type ProgressFn = Arc<dyn Fn(&DownloadEvent) + Send + Sync>;

/// Outcome of [`GitHubDownloader::download`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Local directories of the skills found, in discovery order.
    pub skills: Vec<PathBuf>,
    /// Files written.
    pub files: usize,
    /// Listings or files that could not be fetched.
    pub failures: usize,
    /// Whether the stop flag cut the download short.
    pub stopped: bool,
    /// Whether the owner's address record was rewritten.
    pub recorded: bool,
}

type Pending<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Downloads every skill below a GitHub tree URL.
///
/// A directory whose listing contains a `SKILL.md` (any case) is a skill and
/// is downloaded completely. Other directories are searched recursively.
pub struct GitHubDownloader {
    client: reqwest::Client,
    api_base: String,
    stop: StopFlag,
    progress: Option<ProgressFn>,
}

impl GitHubDownloader {
    /// Uses `GITHUB_API_BASE_URL` when set, else the public API.
    pub fn new(stop: StopFlag) -> Self {
        Self::with_api_base(stop, github_api_base())
    }

    pub fn with_api_base(stop: StopFlag, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            stop,
            progress: None,
        }
    }

    /// Registers a callback for [`DownloadEvent`]s.
    pub fn on_progress(mut self, f: impl Fn(&DownloadEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    /// Downloads the skills under `url` into `output_dir/<owner>/`.
    ///
    /// Individual listing or file failures are logged and counted; only an
    /// unusable URL is an error. When the run was not stopped, `url` is
    /// added to the owner's address record.
    pub async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadReport> {
        let target =
            parse_legacy_tree_url(url).with_context(|| format!("invalid GitHub URL: {url}"))?;
        let api_url = reqwest::Url::parse_with_params(
            &format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_base.trim_end_matches('/'),
                target.owner,
                target.repo,
                target.folder_path
            ),
            &[("ref", target.branch.as_str())],
        )
        .context("building contents API URL")?;

        let owner_dir = output_dir.join(&target.owner);
        let root_name = (!target.skill_name.is_empty()).then(|| target.skill_name.clone());
        tracing::info!(
            owner = %target.owner,
            repo = %target.repo,
            folder = %target.folder_path,
            "analyzing directory structure"
        );

        let mut report = DownloadReport::default();
        self.search(api_url.to_string(), &owner_dir, root_name, &mut report)
            .await;
        report.stopped = self.stop.is_stopped();

        if !report.stopped {
            match record_address(&owner_dir, url) {
                Ok(written) => report.recorded = written,
                Err(err) => tracing::warn!(error = %err, "failed to record address"),
            }
        }
        Ok(report)
    }

    /// Looks for skill directories at and below `api_url`.
    fn search<'a>(
        &'a self,
        api_url: String,
        owner_dir: &'a Path,
        dir_name: Option<String>,
        report: &'a mut DownloadReport,
    ) -> Pending<'a> {
        Box::pin(async move {
            if self.stop.is_stopped() {
                return;
            }
            let Some(items) = self.list(&api_url, report).await else {
                return;
            };

            if items
                .iter()
                .any(|item| item.name.eq_ignore_ascii_case(DESCRIPTOR_FILE))
            {
                let Some(name) = dir_name.filter(|n| is_safe_name(n)) else {
                    self.fail(report, &api_url, "skill found but its name is unknown");
                    return;
                };
                let dest = owner_dir.join(&name);
                if let Err(err) = tokio::fs::create_dir_all(&dest).await {
                    self.fail(report, &api_url, err);
                    return;
                }
                self.emit(&DownloadEvent::SkillFound {
                    name,
                    path: dest.clone(),
                });
                self.download_items(items, &dest, report).await;
                report.skills.push(dest);
                return;
            }

            for item in items {
                if self.stop.is_stopped() {
                    return;
                }
                if item.kind != "dir" {
                    continue;
                }
                if let Some(url) = item.url {
                    self.search(url, owner_dir, Some(item.name), report).await;
                }
            }
        })
    }

    /// Downloads `items` and everything below them into `local_dir`.
    fn download_items<'a>(
        &'a self,
        items: Vec<ContentItem>,
        local_dir: &'a Path,
        report: &'a mut DownloadReport,
    ) -> Pending<'a> {
        Box::pin(async move {
            for item in items {
                if self.stop.is_stopped() {
                    return;
                }
                if !is_safe_name(&item.name) {
                    let url = item.url.as_deref().unwrap_or_default();
                    self.fail(report, url, format!("unsafe entry name {:?}", item.name));
                    continue;
                }
                let path = local_dir.join(&item.name);
                match item.kind.as_str() {
                    "dir" => {
                        if let Err(err) = tokio::fs::create_dir_all(&path).await {
                            self.fail(report, item.url.as_deref().unwrap_or_default(), err);
                            continue;
                        }
                        self.emit(&DownloadEvent::DirCreated(path.clone()));
                        let Some(url) = item.url.as_deref() else {
                            continue;
                        };
                        if self.stop.is_stopped() {
                            return;
                        }
                        let Some(children) = self.list(url, report).await else {
                            continue;
                        };
                        self.download_items(children, &path, report).await;
                    }
                    "file" => self.download_file(&item, &path, report).await,
                    other => tracing::debug!(name = %item.name, kind = other, "skipping entry"),
                }
            }
        })
    }

    async fn download_file(&self, item: &ContentItem, path: &Path, report: &mut DownloadReport) {
        let Some(url) = item.download_url.as_deref() else {
            self.fail(report, "", format!("{} has no download URL", item.name));
            return;
        };
        self.emit(&DownloadEvent::FileStarted(path.to_path_buf()));
        let result = async {
            let response = apply_github_auth(
                self.client
                    .get(url)
                    .header(USER_AGENT, CLIENT_USER_AGENT),
            )
            .send()
            .await?
            .error_for_status()?;
            let bytes = response.bytes().await?;
            tokio::fs::write(path, &bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            anyhow::Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                report.files += 1;
                self.emit(&DownloadEvent::FileDone(path.to_path_buf()));
            }
            Err(err) => self.fail(report, url, format!("{err:#}")),
        }
    }

    /// Fetches one contents listing. Failures are recorded and yield `None`.
    async fn list(&self, api_url: &str, report: &mut DownloadReport) -> Option<Vec<ContentItem>> {
        let response = apply_github_auth(
            self.client
                .get(api_url)
                .header(ACCEPT, "application/vnd.github.v3+json")
                .header(USER_AGENT, CLIENT_USER_AGENT),
        )
        .send()
        .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.fail(report, api_url, err);
                return None;
            }
        };
        if !response.status().is_success() {
            let status = response.status();
            self.fail(report, api_url, format!("HTTP {status}"));
            return None;
        }
        match response.json::<Listing>().await {
            Ok(listing) => Some(listing.into_items()),
            Err(err) => {
                self.fail(report, api_url, err);
                None
            }
        }
    }

    fn emit(&self, event: &DownloadEvent) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }

    fn fail(&self, report: &mut DownloadReport, url: &str, message: impl fmt::Display) {
        tracing::warn!(url, error = %message, "download step failed");
        report.failures += 1;
        self.emit(&DownloadEvent::Failed {
            url: url.to_string(),
            message: message.to_string(),
        });
    }
}

/// Entry names from the API become local path components.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use skillbridge_test_utils::set_env_var;

    #[test]
    #[serial]
    fn test_github_api_base_default() {
        let _api_guard = set_env_var("GITHUB_API_BASE_URL", None);
        assert_eq!(github_api_base(), "https://api.github.com");
    }

    #[test]
    #[serial]
    fn test_github_auth_header_set_when_token_present() {
        let _token_guard = set_env_var("GITHUB_TOKEN", Some("  test-token  "));
        let client = reqwest::Client::new();
        let request = apply_github_auth(client.get("https://api.github.com"))
            .build()
            .unwrap();
        let header = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer test-token");
    }

    #[test]
    #[serial]
    fn test_github_auth_header_absent_when_empty_token() {
        let _token_guard = set_env_var("GITHUB_TOKEN", Some(""));
        let client = reqwest::Client::new();
        let request = apply_github_auth(client.get("https://api.github.com"))
            .build()
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn single_file_listing_is_wrapped() {
        let listing: Listing = serde_json::from_str(
            r#"{"name": "SKILL.md", "type": "file", "download_url": "http://x/SKILL.md"}"#,
        )
        .unwrap();
        let items = listing.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "SKILL.md");
    }

    #[test]
    fn unsafe_names_are_rejected() {
        assert!(is_safe_name("skill"));
        assert!(!is_safe_name(".."));
        assert!(!is_safe_name("a/b"));
        assert!(!is_safe_name(""));
    }
}
