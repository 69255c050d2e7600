//! GitHub tree URL parsing.
//!
//! [`parse_github_tree_url`] is strict and feeds destination previews.
//! [`parse_legacy_tree_url`] is the permissive splitter the downloader uses;
//! a URL the preview rejects may still download.

use crate::error::UrlParseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Where a GitHub tree URL points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// `/`-joined path inside the repository; may be empty.
    pub folder_path: String,
    /// Last segment of `folder_path`, or empty.
    pub skill_name: String,
}

impl InstallTarget {
    fn new(owner: &str, repo: &str, branch: &str, folder: &[&str]) -> Self {
        let folder_path = folder.join("/");
        let skill_name = folder_path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            folder_path,
            skill_name,
        }
    }
}

/// Parses `https://github.com/{owner}/{repo}/tree/{branch}/{folder...}`.
///
/// The scheme is optional. Trailing slashes, query and fragment are ignored.
pub fn parse_github_tree_url(input: &str) -> Result<InstallTarget, UrlParseError> {
    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    let url = Url::parse(&with_scheme).map_err(|_| UrlParseError::NotGithub)?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if !host.ends_with("github.com") {
        return Err(UrlParseError::NotGithub);
    }

    let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        [owner, repo, "tree", branch, folder @ ..] => {
            Ok(InstallTarget::new(owner, repo, branch, folder))
        }
        _ => Err(UrlParseError::ParseFailed),
    }
}

/// Permissive parser used at download time.
///
/// Splits on `/` and reads owner, repo, branch and folder by position; the
/// `tree` segment is not checked.
pub fn parse_legacy_tree_url(input: &str) -> Result<InstallTarget, UrlParseError> {
    let parts: Vec<&str> = input.trim_matches('/').split('/').collect();
    if !parts.contains(&"github.com") {
        return Err(UrlParseError::NotGithub);
    }
    if parts.len() < 7 {
        return Err(UrlParseError::ParseFailed);
    }
    Ok(InstallTarget::new(parts[3], parts[4], parts[6], &parts[7..]))
}

/// Predicted directory a download of `url` into `target_root` ends up in:
/// `target_root/<owner>/<skill name>`.
pub fn get_install_final_output_dir(url: &str, target_root: &Path) -> Option<PathBuf> {
    let target = parse_github_tree_url(url).ok()?;
    if target.owner.is_empty() || target.skill_name.is_empty() {
        return None;
    }
    Some(target_root.join(&target.owner).join(&target.skill_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> InstallTarget {
        InstallTarget {
            owner: "owner".into(),
            repo: "repo".into(),
            branch: "main".into(),
            folder_path: "path/to/skill".into(),
            skill_name: "skill".into(),
        }
    }

    #[test]
    fn cosmetic_variants_parse_identically() {
        for url in [
            "https://github.com/owner/repo/tree/main/path/to/skill",
            "https://github.com/owner/repo/tree/main/path/to/skill/",
            "https://github.com/owner/repo/tree/main/path/to/skill?x=1#y",
            "github.com/owner/repo/tree/main/path/to/skill",
            "  //github.com/owner/repo/tree/main/path/to/skill  ",
        ] {
            assert_eq!(parse_github_tree_url(url), Ok(expected()), "{url}");
        }
    }

    #[test]
    fn non_github_host_is_distinct_from_bad_path() {
        assert_eq!(
            parse_github_tree_url("https://example.com/owner/repo/tree/main/x"),
            Err(UrlParseError::NotGithub)
        );
        assert_eq!(
            parse_github_tree_url("https://github.com/owner/repo"),
            Err(UrlParseError::ParseFailed)
        );
        assert_eq!(
            parse_github_tree_url("https://github.com/owner/repo/blob/main/x"),
            Err(UrlParseError::ParseFailed)
        );
        assert_eq!(UrlParseError::NotGithub.code(), "not_github");
    }

    #[test]
    fn branch_without_folder_has_empty_skill_name() {
        let target = parse_github_tree_url("https://www.github.com/o/r/tree/dev").unwrap();
        assert_eq!(target.branch, "dev");
        assert_eq!(target.folder_path, "");
        assert_eq!(target.skill_name, "");
    }

    #[test]
    fn final_output_dir_uses_owner_and_skill() {
        let root = Path::new("/target");
        for url in [
            "https://github.com/owner/repo/tree/main/path/to/skill",
            "https://github.com/owner/repo/tree/main/path/to/skill/",
            "https://github.com/owner/repo/tree/main/path/to/skill?x=1#y",
            "github.com/owner/repo/tree/main/path/to/skill",
        ] {
            assert_eq!(
                get_install_final_output_dir(url, root),
                Some(root.join("owner").join("skill"))
            );
        }
        assert_eq!(get_install_final_output_dir("not a url", root), None);
        assert_eq!(
            get_install_final_output_dir("https://github.com/o/r/tree/main", root),
            None
        );
    }

    #[test]
    fn legacy_parser_reads_positions() {
        let target =
            parse_legacy_tree_url("https://github.com/owner/repo/tree/main/path/to/skill/").unwrap();
        assert_eq!(target, expected());
        assert_eq!(
            parse_legacy_tree_url("https://gitlab.com/owner/repo/tree/main/x"),
            Err(UrlParseError::NotGithub)
        );
        assert_eq!(
            parse_legacy_tree_url("https://github.com/owner/repo"),
            Err(UrlParseError::ParseFailed)
        );
    }

    #[test]
    fn legacy_parser_accepts_what_preview_rejects() {
        let url = "https://github.com/owner/repo/blob/main/skill";
        assert!(parse_github_tree_url(url).is_err());
        let target = parse_legacy_tree_url(url).unwrap();
        assert_eq!(target.skill_name, "skill");
    }
}
