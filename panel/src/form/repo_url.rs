//! Source repository URL validation

use url::Url;

const REPO_HOST: &str = "github.com";

/// True when `raw` is an absolute URL on github.com naming at least `/owner/repo`
pub fn is_valid_repo_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    if url.host_str() != Some(REPO_HOST) {
        return false;
    }

    let mut segments = url.path().split('/').skip(1);
    matches!(
        (segments.next(), segments.next()),
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty()
    )
}
